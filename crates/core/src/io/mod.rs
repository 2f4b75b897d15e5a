//! Reading and writing band files and products
//!
//! Two seams keep the fusion code independent of file formats:
//! [`RasterSource`] opens a single-band raster and [`RasterWriter`] writes a
//! band stack. Drivers:
//! - [`TiffDriver`]: native GeoTIFF via the `tiff` crate (always available)
//! - `GdalDriver`: GDAL-backed, behind the `gdal` feature
//! - [`MemoryDriver`]: in-memory store for tests and dry runs

#[cfg(feature = "gdal")]
mod gdal_io;
mod memory;
mod native;

#[cfg(feature = "gdal")]
pub use gdal_io::GdalDriver;
pub use memory::MemoryDriver;
pub use native::{
    read_geotiff, read_geotiff_from_buffer, read_multiband_geotiff, write_geotiff,
    write_geotiff_to_buffer, TiffDriver,
};

/// Driver used by the command-line tools
#[cfg(feature = "gdal")]
pub type DefaultDriver = GdalDriver;

/// Driver used by the command-line tools
#[cfg(not(feature = "gdal"))]
pub type DefaultDriver = TiffDriver;

use crate::error::Result;
use crate::raster::{MultiBandRaster, Raster};
use std::path::Path;

/// Opens single-band rasters by path.
///
/// Any failure (missing file, unreadable format) is reported as an error;
/// callers that fall back between candidates treat every error as "absent".
pub trait RasterSource {
    fn open(&self, path: &Path) -> Result<Raster<f64>>;
}

/// Writes a band stack, with its georeferencing, to a path.
///
/// The output is complete and flushed when the call returns.
pub trait RasterWriter {
    fn write(&self, raster: &MultiBandRaster<f64>, path: &Path, options: &WriteOptions) -> Result<()>;
}

impl<T: RasterSource + ?Sized> RasterSource for &T {
    fn open(&self, path: &Path) -> Result<Raster<f64>> {
        (**self).open(path)
    }
}

impl<T: RasterWriter + ?Sized> RasterWriter for &T {
    fn write(&self, raster: &MultiBandRaster<f64>, path: &Path, options: &WriteOptions) -> Result<()> {
        (**self).write(raster, path, options)
    }
}

/// Sample type of a written product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    /// 8-bit unsigned; float samples are rounded and saturated to 0..=255
    Byte,
    /// 32-bit IEEE float, written unclamped
    Float32,
}

/// Compression of a written product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Deflate,
}

/// Photometric interpretation of a written product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Photometric {
    MinIsBlack,
    Rgb,
}

/// Creation options for written products
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub pixel_type: PixelType,
    pub compression: Compression,
    pub photometric: Photometric,
}

impl WriteOptions {
    /// 8-bit RGB, DEFLATE-compressed: the composite product
    pub fn rgb_composite() -> Self {
        Self {
            pixel_type: PixelType::Byte,
            compression: Compression::Deflate,
            photometric: Photometric::Rgb,
        }
    }

    /// Single-band float: the pansharpened products
    pub fn float_band() -> Self {
        Self {
            pixel_type: PixelType::Float32,
            compression: Compression::None,
            photometric: Photometric::MinIsBlack,
        }
    }

    /// GDAL-style creation options, e.g. `["PHOTOMETRIC=RGB", "COMPRESS=DEFLATE"]`
    pub fn creation_options(&self) -> Vec<String> {
        let mut options = Vec::new();
        if self.photometric == Photometric::Rgb {
            options.push("PHOTOMETRIC=RGB".to_string());
        }
        if self.compression == Compression::Deflate {
            options.push("COMPRESS=DEFLATE".to_string());
        }
        options
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::float_band()
    }
}

/// Convert a float sample to a byte the way GDAL does when writing a
/// float buffer to a Byte band: round, then saturate.
pub fn to_byte(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}
