//! # eofuse Core
//!
//! Core types, scene layout and I/O for the eofuse EO-1 toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: single-band georeferenced grid
//! - `MultiBandRaster<T>`: band stack sharing one georeferencing
//! - `GeoTransform` and `CRS` for georeferencing
//! - `SceneId` / `SceneLayout`: where a scene's band files live on disk
//! - `BandSpec` / `BandResolver`: ordered band fallback per output channel
//! - `RasterSource` / `RasterWriter` with native TIFF, GDAL and in-memory drivers
//! - `FeedEntry`: Atom entry describing a georeferenced product

pub mod bands;
pub mod crs;
pub mod error;
pub mod feed;
pub mod io;
pub mod raster;
pub mod scene;

pub use bands::{BandId, BandResolver, BandSpec, ResolvedBand};
pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, MultiBandRaster, Raster, RasterElement};
pub use scene::{Instrument, SceneId, SceneLayout};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bands::{BandId, BandResolver, BandSpec, ResolvedBand};
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::io::{RasterSource, RasterWriter, WriteOptions};
    pub use crate::raster::{GeoTransform, MultiBandRaster, Raster, RasterElement};
    pub use crate::scene::{Instrument, SceneId, SceneLayout};
    pub use crate::Algorithm;
}

/// Core trait for the raster algorithms in eofuse.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
