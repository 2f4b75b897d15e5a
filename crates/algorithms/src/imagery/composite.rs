//! Three-band RGB compositing

use eofuse_core::raster::{MultiBandRaster, Raster, RasterElement};
use eofuse_core::{Error, Result};

/// Number of bands in an RGB composite
pub const COMPOSITE_CHANNELS: usize = 3;

/// Stack three stretched bands into an RGB raster.
///
/// `bands[0..3]` become channels 1, 2 and 3 with their samples unchanged.
/// Transform, CRS and metadata are copied verbatim from `reference`, and
/// every band must match the reference's shape.
pub fn compose<T, U>(bands: &[Raster<T>], reference: &Raster<U>) -> Result<MultiBandRaster<T>>
where
    T: RasterElement,
    U: RasterElement,
{
    if bands.len() != COMPOSITE_CHANNELS {
        return Err(Error::InvalidParameter {
            name: "bands",
            value: bands.len().to_string(),
            reason: format!("an RGB composite needs exactly {} bands", COMPOSITE_CHANNELS),
        });
    }

    let expected = reference.shape();
    if let Some(band) = bands.iter().find(|b| b.shape() != expected) {
        return Err(Error::mismatch(expected, band.shape()));
    }

    let mut composite = MultiBandRaster::from_bands(bands.iter().map(|b| b.data().clone()).collect())?;
    composite.copy_georeferencing(reference);
    Ok(composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::{stretch, StretchParams};
    use eofuse_core::{GeoTransform, CRS};
    use ndarray::Array2;

    fn reference() -> Raster<f64> {
        let mut r = Raster::from_vec(vec![10.0, 20.0, 30.0, 40.0], 2, 2).unwrap();
        r.set_transform(GeoTransform::from_gdal([600000.0, 30.0, 0.0, 4100000.0, 0.0, -30.0]));
        r.set_crs(Some(CRS::from_wkt(r#"PROJCS["UTM 18N",AUTHORITY["EPSG","32618"]]"#)));
        r.insert_metadata("AREA_OR_POINT", "Point");
        r
    }

    #[test]
    fn test_identical_sources_give_identical_channels() {
        let src = reference();
        let stretched: Vec<Raster<f64>> = (0..3)
            .map(|_| stretch(&src, &StretchParams::default()).unwrap())
            .collect();
        let rgb = compose(&stretched, &src).unwrap();

        assert_eq!(rgb.band_count(), 3);
        assert_eq!(rgb.shape(), (2, 2));
        let red = rgb.band(0).unwrap();
        assert_eq!(rgb.band(1).unwrap(), red);
        assert_eq!(rgb.band(2).unwrap(), red);
        assert_eq!(red, stretched[0].view());
    }

    #[test]
    fn test_georeferencing_copied_from_reference() {
        let src = reference();
        let bands = vec![Raster::filled(2, 2, 1.0), Raster::filled(2, 2, 2.0), Raster::filled(2, 2, 3.0)];
        let rgb = compose(&bands, &src).unwrap();

        assert_eq!(rgb.transform(), src.transform());
        assert_eq!(rgb.crs(), src.crs());
        assert_eq!(rgb.metadata(), src.metadata());
        assert_eq!(rgb.band(2).unwrap()[(1, 1)], 3.0);
    }

    #[test]
    fn test_band_size_mismatch() {
        let src = reference();
        let bands = vec![Raster::filled(2, 2, 1.0), Raster::filled(3, 2, 2.0), Raster::filled(2, 2, 3.0)];
        match compose(&bands, &src) {
            Err(Error::DimensionMismatch { er, ec, ar, ac }) => {
                assert_eq!((er, ec), (2, 2));
                assert_eq!((ar, ac), (3, 2));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_requires_three_bands() {
        let src = reference();
        let bands = vec![Raster::from_array(Array2::<f64>::zeros((2, 2))); 2];
        assert!(matches!(
            compose(&bands, &src),
            Err(Error::InvalidParameter { name: "bands", .. })
        ));
    }
}
