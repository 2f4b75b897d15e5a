//! Error types for eofuse

use crate::bands::BandId;
use thiserror::Error;

/// Main error type for eofuse operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    DimensionMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("No viable band found for channel {channel}; tried bands {attempted:?}")]
    BandNotFound { channel: usize, attempted: Vec<BandId> },

    #[error("Band specification for channel {channel} has no candidates")]
    EmptyBandSpec { channel: usize },

    #[error("Zero dynamic range in nonzero samples: low = {lo}, high = {hi}")]
    DegenerateStretch { lo: f64, hi: f64 },

    #[error("Pansharpening requires at least one multispectral band")]
    EmptyBandSet,

    #[error("Invalid scene id '{id}': {reason}")]
    InvalidSceneId { id: String, reason: String },

    #[error("Unsupported instrument for {operation}: {instrument}")]
    UnsupportedInstrument {
        instrument: String,
        operation: &'static str,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("GDAL error: {0}")]
    #[cfg(feature = "gdal")]
    Gdal(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

impl Error {
    /// Build a [`Error::DimensionMismatch`] from two `(rows, cols)` shapes.
    pub fn mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Error::DimensionMismatch {
            er: expected.0,
            ec: expected.1,
            ar: actual.0,
            ac: actual.1,
        }
    }
}

/// Result type alias for eofuse operations
pub type Result<T> = std::result::Result<T, Error>;
