//! Imagery products for EO-1 scenes
//!
//! - Stretch: 1st/97th percentile linear stretch to a displayable range
//! - Composite: three stretched bands stacked into one RGB raster
//! - Pansharpen: Brovey-style ratio fusion with a higher-resolution pan band

mod composite;
mod pansharpen;
mod stretch;

pub use composite::{compose, COMPOSITE_CHANNELS};
pub use pansharpen::{
    block_replicate, band_mean, pansharpen, trim_edges, Pansharpen, SharpenParams,
};
pub use stretch::{stretch, stretch_bands, Stretch, StretchParams};
