//! # eofuse Algorithms
//!
//! Raster fusion for EO-1 scenes.
//!
//! - **statistics**: percentiles over the nonzero sample population
//! - **imagery**: percentile stretch, RGB compositing, Brovey pansharpening
//! - **products**: scene-level drivers that resolve bands, run the imagery
//!   algorithms and hand the results to a writer

pub mod imagery;
pub mod products;
pub mod statistics;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        block_replicate, compose, pansharpen, stretch, stretch_bands, Pansharpen, SharpenParams,
        Stretch, StretchParams,
    };
    pub use crate::products::{create_pansharpened, create_rgb, PansharpenReport, RgbReport};
    pub use crate::statistics::{nonzero_percentiles, percentile};
    pub use eofuse_core::prelude::*;
}
