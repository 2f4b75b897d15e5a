//! Percentile linear stretch
//!
//! Maps raw band samples onto `0..=255 * scale_factor` using the 1st and
//! 97th percentiles of the nonzero samples as the display range:
//!
//! ```text
//! v   = (s - lo) / (hi - lo)
//! v   = min(v, 1)
//! out = v * 255 * scale_factor
//! ```
//!
//! Only the upper end is clipped. Samples below `lo`, including the zero
//! no-data pixels, map to negative values and are left for the writer to
//! saturate.

use crate::maybe_rayon::*;
use crate::statistics::nonzero_percentiles;
use eofuse_core::raster::Raster;
use eofuse_core::{Algorithm, Error, Result};
use tracing::debug;

/// Parameters for the percentile stretch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchParams {
    /// Brightening multiplier applied after the stretch (> 0)
    pub scale_factor: f64,
    /// Percentile mapped to 0
    pub low_percentile: f64,
    /// Percentile mapped to 255 * scale_factor
    pub high_percentile: f64,
}

impl StretchParams {
    /// Default percentiles with a custom brightening factor
    pub fn with_scale(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(Error::InvalidParameter {
                name: "scale_factor",
                value: self.scale_factor.to_string(),
                reason: "must be a positive finite number".into(),
            });
        }
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !(in_range(self.low_percentile)
            && in_range(self.high_percentile)
            && self.low_percentile < self.high_percentile)
        {
            return Err(Error::InvalidParameter {
                name: "percentiles",
                value: format!("{}/{}", self.low_percentile, self.high_percentile),
                reason: "need 0 <= low < high <= 100".into(),
            });
        }
        Ok(())
    }
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            low_percentile: 1.0,
            high_percentile: 97.0,
        }
    }
}

/// Percentile stretch algorithm
#[derive(Debug, Clone, Default)]
pub struct Stretch;

impl Algorithm for Stretch {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = StretchParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Stretch"
    }

    fn description(&self) -> &'static str {
        "Linear 1st/97th percentile stretch of nonzero samples to 0..255"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        stretch(&input, &params)
    }
}

/// Stretch one band.
///
/// The output keeps the input's georeferencing. Fails with
/// [`Error::DegenerateStretch`] when the band has no nonzero samples or
/// its low and high percentiles coincide.
pub fn stretch(raster: &Raster<f64>, params: &StretchParams) -> Result<Raster<f64>> {
    params.validate()?;

    let (lo, hi) = nonzero_percentiles(raster.view(), params.low_percentile, params.high_percentile)
        .ok_or(Error::DegenerateStretch { lo: 0.0, hi: 0.0 })?;
    if hi <= lo {
        return Err(Error::DegenerateStretch { lo, hi });
    }
    debug!("Stretch range: lo = {}, hi = {}", lo, hi);

    let range = hi - lo;
    let gain = 255.0 * params.scale_factor;
    let data = raster.data().mapv(|s| ((s - lo) / range).min(1.0) * gain);

    Ok(raster.with_data(data))
}

/// Stretch several bands independently, in parallel when enabled.
///
/// Output order matches input order.
pub fn stretch_bands(rasters: &[&Raster<f64>], params: &StretchParams) -> Result<Vec<Raster<f64>>> {
    (0..rasters.len())
        .into_par_iter()
        .map(|i| stretch(rasters[i], params))
        .collect()
}
