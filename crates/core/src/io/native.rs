//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate. Georeferencing is stored in the standard GeoTIFF
//! tags (pixel scale + tiepoint, or a full model transformation when the
//! transform is rotated), the projection WKT in `GeoAsciiParamsTag` and the
//! metadata map as `KEY=VALUE` lines in `ImageDescription`.

use super::{to_byte, Compression, Photometric, PixelType, RasterSource, RasterWriter, WriteOptions};
use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Metadata, MultiBandRaster, Raster, RasterElement};
use ndarray::Array2;
use num_traits::NumCast;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{self, Gray32Float, Gray8, RGB8};
use tiff::encoder::compression::{Compression as TiffCompression, Deflate, Uncompressed};
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind, TiffValue};
use tiff::tags::Tag;
use tiff::ColorType;

const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
const MODEL_TRANSFORMATION: Tag = Tag::ModelTransformationTag;
const GEO_KEY_DIRECTORY: Tag = Tag::GeoKeyDirectoryTag;
const GEO_ASCII_PARAMS: Tag = Tag::GeoAsciiParamsTag;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GT_CITATION_KEY: u16 = 1026;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
const USER_DEFINED: u16 = 32767;

/// GeoTIFF driver backed by the `tiff` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffDriver;

impl RasterSource for TiffDriver {
    fn open(&self, path: &Path) -> Result<Raster<f64>> {
        read_geotiff(path, None)
    }
}

impl RasterWriter for TiffDriver {
    fn write(&self, raster: &MultiBandRaster<f64>, path: &Path, options: &WriteOptions) -> Result<()> {
        write_geotiff(raster, path, options)
    }
}

/// Read one band (1-indexed, default 1) of a GeoTIFF file
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let stack = read_multiband_geotiff(path)?;
    select_band(stack, band)
}

/// Read every band of a GeoTIFF file
pub fn read_multiband_geotiff<T, P>(path: P) -> Result<MultiBandRaster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(BufReader::new(file))
}

/// Read one band (1-indexed, default 1) of an in-memory GeoTIFF
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    let stack = decode_geotiff(Cursor::new(data))?;
    select_band(stack, band)
}

fn select_band<T: RasterElement>(stack: MultiBandRaster<T>, band: Option<usize>) -> Result<Raster<T>> {
    let band = band.unwrap_or(1);
    band.checked_sub(1)
        .and_then(|index| stack.to_raster(index))
        .ok_or_else(|| Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("file has {} band(s)", stack.band_count()),
        })
}

fn cast_samples<S, T>(buf: Vec<S>) -> Result<Vec<T>>
where
    S: NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| {
            num_traits::cast(v).ok_or_else(|| {
                Error::UnsupportedDataType("sample not representable in target type".into())
            })
        })
        .collect()
}

/// Internal: decode a GeoTIFF from any `Read + Seek` source
fn decode_geotiff<T, R>(reader: R) -> Result<MultiBandRaster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;

    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let samples = match decoder.colortype()? {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) | ColorType::CMYK(_) => 4,
        other => {
            return Err(Error::UnsupportedDataType(format!(
                "unsupported TIFF color type {:?}",
                other
            )))
        }
    };

    let data: Vec<T> = match decoder.read_image()? {
        DecodingResult::U8(buf) => cast_samples(buf)?,
        DecodingResult::U16(buf) => cast_samples(buf)?,
        DecodingResult::U32(buf) => cast_samples(buf)?,
        DecodingResult::U64(buf) => cast_samples(buf)?,
        DecodingResult::I8(buf) => cast_samples(buf)?,
        DecodingResult::I16(buf) => cast_samples(buf)?,
        DecodingResult::I32(buf) => cast_samples(buf)?,
        DecodingResult::I64(buf) => cast_samples(buf)?,
        DecodingResult::F32(buf) => cast_samples(buf)?,
        DecodingResult::F64(buf) => cast_samples(buf)?,
        #[allow(unreachable_patterns)]
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    if rows == 0 || cols == 0 || data.len() != rows * cols * samples {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    // Pixel-interleaved samples -> one array per band
    let bands: Vec<Array2<T>> = (0..samples)
        .map(|band| Array2::from_shape_fn((rows, cols), |(r, c)| data[(r * cols + c) * samples + band]))
        .collect();
    let mut stack = MultiBandRaster::from_bands(bands)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        stack.set_transform(transform);
    }
    stack.set_crs(read_crs(&mut decoder));
    if let Ok(description) = decoder.get_tag_ascii_string(Tag::ImageDescription) {
        stack.set_metadata(parse_metadata(&description));
    }

    Ok(stack)
}

/// Read the GeoTransform from ModelTransformationTag, or from
/// ModelPixelScaleTag + ModelTiepointTag
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    if let Ok(m) = decoder.get_tag_f64_vec(MODEL_TRANSFORMATION) {
        if m.len() >= 8 {
            return Some(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
    }

    let scale = decoder.get_tag_f64_vec(MODEL_PIXEL_SCALE).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(MODEL_TIEPOINT).ok()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Read the CRS from the WKT citation and/or the EPSG geokeys
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let epsg = decoder
        .get_tag_u16_vec(GEO_KEY_DIRECTORY)
        .ok()
        .and_then(|keys| epsg_from_geokeys(&keys));
    let wkt = decoder
        .get_tag_ascii_string(GEO_ASCII_PARAMS)
        .ok()
        .and_then(|params| params.split('|').next().map(str::to_string))
        .filter(|wkt| !wkt.is_empty());

    match (wkt, epsg) {
        (Some(wkt), Some(code)) => Some(CRS::from_wkt(wkt).with_epsg(code)),
        (Some(wkt), None) => Some(CRS::from_wkt(wkt)),
        (None, Some(code)) => Some(CRS::from_epsg(code)),
        (None, None) => None,
    }
}

fn epsg_from_geokeys(keys: &[u16]) -> Option<u32> {
    keys.get(4..)?
        .chunks_exact(4)
        .find(|entry| {
            (entry[0] == PROJECTED_CS_TYPE_KEY || entry[0] == GEOGRAPHIC_TYPE_KEY)
                && entry[1] == 0
                && entry[3] != USER_DEFINED
        })
        .map(|entry| <u32 as From<u16>>::from(entry[3]))
}

fn parse_metadata(description: &str) -> Metadata {
    description
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .collect()
}

fn format_metadata(metadata: &Metadata) -> String {
    metadata
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write a band stack to a GeoTIFF file
pub fn write_geotiff<P: AsRef<Path>>(
    raster: &MultiBandRaster<f64>,
    path: P,
    options: &WriteOptions,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    encode_geotiff(raster, &mut file, options)?;
    file.flush()?;
    Ok(())
}

/// Write a band stack to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer(raster: &MultiBandRaster<f64>, options: &WriteOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), options)?;
    Ok(buf)
}

/// Internal: encode a band stack as GeoTIFF into any `Write + Seek` sink
fn encode_geotiff<W>(raster: &MultiBandRaster<f64>, writer: W, options: &WriteOptions) -> Result<()>
where
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let bands = raster.band_count();

    match (options.pixel_type, options.photometric, bands) {
        (PixelType::Byte, Photometric::Rgb, 3) => {
            let data = interleave(raster, to_byte);
            encode_with::<_, RGB8>(&mut encoder, raster, &data, options.compression)
        }
        (PixelType::Byte, Photometric::MinIsBlack, 1) => {
            let data = interleave(raster, to_byte);
            encode_with::<_, Gray8>(&mut encoder, raster, &data, options.compression)
        }
        (PixelType::Float32, Photometric::MinIsBlack, 1) => {
            let data = interleave(raster, |v| v as f32);
            encode_with::<_, Gray32Float>(&mut encoder, raster, &data, options.compression)
        }
        (pixel_type, photometric, bands) => Err(Error::UnsupportedDataType(format!(
            "{:?} {:?} with {} band(s)",
            pixel_type, photometric, bands
        ))),
    }
}

fn interleave<O>(raster: &MultiBandRaster<f64>, convert: impl Fn(f64) -> O) -> Vec<O> {
    let (rows, cols) = raster.shape();
    let bands: Vec<_> = raster.bands().collect();
    let mut out = Vec::with_capacity(rows * cols * bands.len());
    for r in 0..rows {
        for c in 0..cols {
            out.extend(bands.iter().map(|band| convert(band[(r, c)])));
        }
    }
    out
}

fn encode_with<W, C>(
    encoder: &mut TiffEncoder<W>,
    raster: &MultiBandRaster<f64>,
    data: &[C::Inner],
    compression: Compression,
) -> Result<()>
where
    W: Write + Seek,
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    match compression {
        Compression::None => encode_image::<W, C, _>(encoder, raster, data, Uncompressed),
        Compression::Deflate => encode_image::<W, C, _>(encoder, raster, data, Deflate::default()),
    }
}

fn encode_image<W, C, D>(
    encoder: &mut TiffEncoder<W>,
    raster: &MultiBandRaster<f64>,
    data: &[C::Inner],
    compression: D,
) -> Result<()>
where
    W: Write + Seek,
    C: colortype::ColorType,
    D: TiffCompression,
    [C::Inner]: TiffValue,
{
    let (rows, cols) = raster.shape();
    let mut image =
        encoder.new_image_with_compression::<C, D>(cols as u32, rows as u32, compression)?;
    write_geo_tags(image.encoder(), raster)?;
    image.write_data(data)?;
    Ok(())
}

fn write_geo_tags<W, K>(dir: &mut DirectoryEncoder<'_, W, K>, raster: &MultiBandRaster<f64>) -> Result<()>
where
    W: Write + Seek,
    K: TiffKind,
{
    let gt = raster.transform();
    if gt.has_rotation() {
        let matrix = [
            gt.pixel_width, gt.row_rotation, 0.0, gt.origin_x,
            gt.col_rotation, gt.pixel_height, 0.0, gt.origin_y,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        dir.write_tag(MODEL_TRANSFORMATION, &matrix[..])?;
    } else {
        let scale = [gt.pixel_width, -gt.pixel_height, 0.0];
        dir.write_tag(MODEL_PIXEL_SCALE, &scale[..])?;
        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        dir.write_tag(MODEL_TIEPOINT, &tiepoint[..])?;
    }

    let crs = raster.crs();
    let epsg = crs.and_then(CRS::resolve_epsg).and_then(|c| u16::try_from(c).ok());
    let citation = crs.and_then(CRS::wkt).map(|wkt| format!("{}|", wkt));
    let geographic = matches!(epsg, Some(4000..=4999));

    // Entries must stay sorted by key id
    let mut keys: Vec<[u16; 4]> = vec![
        [GT_MODEL_TYPE_KEY, 0, 1, if geographic { 2 } else { 1 }],
        [GT_RASTER_TYPE_KEY, 0, 1, 1],
    ];
    if let Some(citation) = &citation {
        let len = u16::try_from(citation.len()).unwrap_or(u16::MAX);
        keys.push([GT_CITATION_KEY, 34737, len, 0]);
    }
    if let Some(code) = epsg {
        let key = if geographic { GEOGRAPHIC_TYPE_KEY } else { PROJECTED_CS_TYPE_KEY };
        keys.push([key, 0, 1, code]);
    }
    let mut directory: Vec<u16> = vec![1, 1, 0, keys.len() as u16];
    directory.extend(keys.iter().flatten());
    dir.write_tag(GEO_KEY_DIRECTORY, directory.as_slice())?;

    if let Some(citation) = &citation {
        dir.write_tag(GEO_ASCII_PARAMS, citation.as_str())?;
    }
    if !raster.metadata().is_empty() {
        dir.write_tag(Tag::ImageDescription, format_metadata(raster.metadata()).as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    fn rgb_stack() -> MultiBandRaster<f64> {
        let bands = vec![
            Array2::from_shape_vec((2, 2), vec![0.0, 85.4, 174.4, 255.0]).unwrap(),
            Array2::from_shape_vec((2, 2), vec![-3.0, 10.0, 20.0, 400.0]).unwrap(),
            Array2::from_elem((2, 2), 128.0),
        ];
        let mut stack = MultiBandRaster::from_bands(bands).unwrap();
        stack.set_transform(GeoTransform::new(300000.0, 4500000.0, 30.0, -30.0));
        stack.set_crs(Some(CRS::from_wkt(
            r#"PROJCS["WGS 84 / UTM zone 33N",AUTHORITY["EPSG","32633"]]"#,
        )));
        let mut metadata = Metadata::new();
        metadata.insert("AREA_OR_POINT".into(), "Point".into());
        stack.set_metadata(metadata);
        stack
    }

    #[test]
    fn test_rgb_composite_roundtrip_through_buffer() {
        let stack = rgb_stack();
        let bytes = write_geotiff_to_buffer(&stack, &WriteOptions::rgb_composite()).unwrap();
        let back: MultiBandRaster<u8> = decode_geotiff(Cursor::new(bytes.as_slice())).unwrap();

        assert_eq!(back.band_count(), 3);
        assert_eq!(back.shape(), (2, 2));
        assert_eq!(back.band(0).unwrap()[(0, 1)], 85);
        assert_eq!(back.band(1).unwrap()[(0, 0)], 0);
        assert_eq!(back.band(1).unwrap()[(1, 1)], 255);
        assert_eq!(back.band(2).unwrap()[(1, 0)], 128);
        assert_eq!(back.transform(), stack.transform());
        assert_eq!(back.crs().and_then(CRS::epsg), Some(32633));
        assert_eq!(back.crs().and_then(CRS::wkt), stack.crs().and_then(CRS::wkt));
        assert_eq!(back.metadata(), stack.metadata());
    }

    #[test]
    fn test_float_band_roundtrip_through_file() {
        let mut raster = Raster::from_vec(vec![1.5, 300.25, -2.0, 1e6], 2, 2).unwrap();
        raster.set_transform(GeoTransform::from_gdal([10.0, 2.0, 0.5, 20.0, 0.25, -2.0]));
        let stack = MultiBandRaster::from_raster(raster);

        let tmp = NamedTempFile::with_suffix(".tif").unwrap();
        write_geotiff(&stack, tmp.path(), &WriteOptions::float_band()).unwrap();
        let back: Raster<f64> = read_geotiff(tmp.path(), None).unwrap();

        assert_eq!(back.shape(), (2, 2));
        assert_relative_eq!(back.get(0, 1).unwrap(), 300.25, epsilon = 1e-6);
        assert_relative_eq!(back.get(1, 1).unwrap(), 1e6, epsilon = 1e-3);
        assert_eq!(back.transform().to_gdal(), [10.0, 2.0, 0.5, 20.0, 0.25, -2.0]);
        assert!(back.crs().is_none());
    }

    #[test]
    fn test_band_index_out_of_range() {
        let stack = rgb_stack();
        let bytes = write_geotiff_to_buffer(&stack, &WriteOptions::rgb_composite()).unwrap();
        assert!(read_geotiff_from_buffer::<u8>(&bytes, Some(3)).is_ok());
        assert!(read_geotiff_from_buffer::<u8>(&bytes, Some(4)).is_err());
        assert!(read_geotiff_from_buffer::<u8>(&bytes, Some(0)).is_err());
    }

    #[test]
    fn test_unsupported_layout_is_rejected() {
        let stack = rgb_stack();
        let result = write_geotiff_to_buffer(&stack, &WriteOptions::float_band());
        assert!(matches!(result, Err(Error::UnsupportedDataType(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = TiffDriver.open(Path::new("/definitely/not/here_B05_L1T.TIF"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_north_up_geotags_read_back() {
        let mut raster = Raster::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        raster.set_transform(GeoTransform::new(300000.0, 4500000.0, 30.0, -30.0));
        raster.set_crs(Some(CRS::from_epsg(32633)));
        let bytes =
            write_geotiff_to_buffer(&MultiBandRaster::from_raster(raster), &WriteOptions::float_band()).unwrap();

        let mut decoder = Decoder::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(decoder.get_tag_f64_vec(MODEL_PIXEL_SCALE).unwrap(), vec![30.0, 30.0, 0.0]);
        let keys = decoder.get_tag_u16_vec(GEO_KEY_DIRECTORY).unwrap();
        assert_eq!(epsg_from_geokeys(&keys), Some(32633));

        let back: Raster<f64> = read_geotiff_from_buffer(&bytes, None).unwrap();
        assert_eq!(back.transform(), &GeoTransform::new(300000.0, 4500000.0, 30.0, -30.0));
        assert_eq!(back.crs().and_then(CRS::epsg), Some(32633));
    }

    #[test]
    fn test_epsg_from_geokeys() {
        let keys = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32618];
        assert_eq!(epsg_from_geokeys(&keys), Some(32618));
        let user_defined = [1, 1, 0, 1, 3072, 0, 1, USER_DEFINED];
        assert_eq!(epsg_from_geokeys(&user_defined), None);
        assert_eq!(epsg_from_geokeys(&[1, 1, 0]), None);
    }
}
