//! Band candidate lists and their resolution against a raster source

mod resolver;
mod spec;

pub use resolver::{BandResolver, ResolvedBand};
pub use spec::{channel_name, BandId, BandSpec};
