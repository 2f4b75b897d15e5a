//! Sample statistics

mod percentile;

pub use percentile::{nonzero_percentiles, nonzero_samples, percentile};
