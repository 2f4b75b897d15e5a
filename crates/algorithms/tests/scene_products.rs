//! End-to-end product runs against a scene archive laid out on disk.
//!
//! Each test builds a temporary archive with the native GeoTIFF driver,
//! runs a product driver over it and reads the written files back.

use eofuse_algorithms::imagery::{SharpenParams, StretchParams};
use eofuse_algorithms::products::{create_pansharpened, create_rgb};
use eofuse_core::io::{read_geotiff, read_multiband_geotiff, write_geotiff, TiffDriver, WriteOptions};
use eofuse_core::{BandId, BandResolver, Error, GeoTransform, MultiBandRaster, Raster, SceneId, SceneLayout, CRS};
use ndarray::{array, Array2};
use std::path::Path;

const ALI_SCENE: &str = "EO1A1930292014029110PZ";

fn layout(base: &Path, scene: &SceneId) -> SceneLayout {
    SceneLayout::for_scene(scene).with_base_path(base)
}

fn write_band(base: &Path, scene: &SceneId, band: BandId, raster: Raster<f64>) {
    let path = layout(base, scene).band_path(scene, band);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_geotiff(&MultiBandRaster::from_raster(raster), &path, &WriteOptions::float_band()).unwrap();
}

fn georeferenced(data: Array2<f64>, pixel: f64) -> Raster<f64> {
    let mut r = Raster::from_array(data);
    r.set_transform(GeoTransform::new(350000.0, 4650000.0, pixel, -pixel));
    r.set_crs(Some(CRS::from_epsg(32633)));
    r
}

#[test]
fn rgb_composite_on_disk() {
    let archive = tempfile::tempdir().unwrap();
    let scene = SceneId::parse(ALI_SCENE).unwrap();
    let band = georeferenced(array![[10.0, 20.0], [30.0, 40.0]], 30.0);
    for b in [5, 4, 3] {
        write_band(archive.path(), &scene, b, band.clone());
    }

    let out = archive.path().join("rgb.tif");
    let resolver = BandResolver::new(TiffDriver, layout(archive.path(), &scene), scene);
    let report = create_rgb(&resolver, &TiffDriver, &out, &StretchParams::default()).unwrap();
    assert_eq!(report.bands, [5, 4, 3]);

    let rgb: MultiBandRaster<u8> = read_multiband_geotiff(&out).unwrap();
    assert_eq!(rgb.band_count(), 3);
    assert_eq!(rgb.shape(), (2, 2));
    let expected = array![[0u8, 86], [174, 255]];
    for channel in rgb.bands() {
        assert_eq!(channel, expected);
    }
    assert_eq!(rgb.transform(), band.transform());
    assert_eq!(rgb.crs().and_then(|c| c.epsg()), Some(32633));
}

#[test]
fn rgb_missing_red_band_writes_nothing() {
    let archive = tempfile::tempdir().unwrap();
    let scene = SceneId::parse(ALI_SCENE).unwrap();
    let band = georeferenced(Array2::from_elem((2, 2), 5.0), 30.0);
    write_band(archive.path(), &scene, 4, band.clone());
    write_band(archive.path(), &scene, 3, band);

    let out = archive.path().join("rgb.tif");
    let resolver = BandResolver::new(TiffDriver, layout(archive.path(), &scene), scene);
    let err = create_rgb(&resolver, &TiffDriver, &out, &StretchParams::default()).unwrap_err();

    assert!(matches!(err, Error::BandNotFound { channel: 0, ref attempted } if attempted.as_slice() == [5u16]));
    assert!(!out.exists());
}

#[test]
fn pansharpened_bands_on_disk() {
    let archive = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let scene = SceneId::parse(ALI_SCENE).unwrap();

    let pan = georeferenced(Array2::from_shape_fn((7, 7), |(r, c)| (10 + r * 7 + c) as f64), 10.0);
    write_band(archive.path(), &scene, 1, pan.clone());
    write_band(archive.path(), &scene, 2, georeferenced(Array2::from_elem((3, 3), 40.0), 30.0));
    write_band(archive.path(), &scene, 4, georeferenced(Array2::from_elem((3, 3), 40.0), 30.0));

    let resolver = BandResolver::new(TiffDriver, layout(archive.path(), &scene), scene);
    let report = create_pansharpened(&resolver, &TiffDriver, out_dir.path(), &SharpenParams::default()).unwrap();
    assert_eq!(report.bands, vec![2, 4]);
    assert_eq!(report.outputs.len(), 2);
    assert_eq!(
        report.outputs[1].file_name().unwrap().to_str().unwrap(),
        format!("{}_B04_L1T.TIF", ALI_SCENE)
    );

    let sharpened: Raster<f64> = read_geotiff(&report.outputs[0], None).unwrap();
    assert_eq!(sharpened.shape(), (6, 6));
    assert_eq!(sharpened.transform(), pan.transform());
    for (r, c) in [(0, 0), (2, 4), (5, 5)] {
        let expected = pan.get(r, c).unwrap();
        assert!((sharpened.get(r, c).unwrap() - expected).abs() < 1e-3);
    }
}
