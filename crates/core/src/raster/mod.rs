//! Raster data structures and operations

mod element;
mod geotransform;
mod grid;
mod multiband;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Metadata, Raster, RasterStatistics};
pub use multiband::MultiBandRaster;
