//! Brovey-style pansharpening by block replication
//!
//! The panchromatic band sees the same ground as each multispectral band
//! with `ratio` times finer pixels along each axis. Detail is injected by
//! ratio fusion:
//!
//! ```text
//! synthetic = mean(ms_1 .. ms_n)                      (low resolution)
//! smooth    = replicate(synthetic, ratio) + epsilon   (pan resolution)
//! out_k     = pan / smooth * replicate(ms_k, ratio)
//! ```
//!
//! `replicate` copies every low-resolution pixel into a `ratio x ratio`
//! block; nothing is interpolated across block boundaries. Before fusion
//! the last `edge_trim` rows and columns of every input are discarded,
//! which aligns ALI L1T tiles (pan `3n + 1`, multispectral `n + 1` pixels)
//! to an exact multiple of the ratio. Outputs are not clamped.

use crate::maybe_rayon::*;
use eofuse_core::raster::Raster;
use eofuse_core::{Algorithm, Error, Result};
use ndarray::{s, Array2, ArrayView2, Zip};
use tracing::debug;

/// Parameters for pansharpening
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpenParams {
    /// Linear resolution ratio between multispectral and panchromatic pixels.
    /// Not checked against the georeferencing; the caller must know it.
    pub ratio: usize,
    /// Rows and columns dropped from the bottom/right edge of every input
    pub edge_trim: usize,
    /// Added to the smoothed synthetic pan before dividing by it
    pub epsilon: f64,
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self {
            ratio: 3,
            edge_trim: 1,
            epsilon: 1e-9,
        }
    }
}

/// Pansharpening algorithm
#[derive(Debug, Clone, Default)]
pub struct Pansharpen;

impl Algorithm for Pansharpen {
    /// Panchromatic band and the multispectral bands to sharpen
    type Input = (Raster<f64>, Vec<Raster<f64>>);
    type Output = Vec<Raster<f64>>;
    type Params = SharpenParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Pansharpen"
    }

    fn description(&self) -> &'static str {
        "Brovey ratio fusion of multispectral bands with a panchromatic band"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (pan, multispectral) = input;
        let refs: Vec<&Raster<f64>> = multispectral.iter().collect();
        pansharpen(&pan, &refs, &params)
    }
}

/// Drop the last `trim` rows and columns.
pub fn trim_edges(data: ArrayView2<'_, f64>, trim: usize) -> Result<ArrayView2<'_, f64>> {
    let (rows, cols) = data.dim();
    if rows <= trim || cols <= trim {
        return Err(Error::InvalidDimensions {
            width: cols.saturating_sub(trim),
            height: rows.saturating_sub(trim),
        });
    }
    Ok(data.slice_move(s![..rows - trim, ..cols - trim]))
}

/// Expand every cell into a `ratio x ratio` block of the same value.
///
/// # Panics
/// When the replicated shape does not fit in memory; [`pansharpen`]
/// checks it against the panchromatic shape first.
pub fn block_replicate(data: ArrayView2<'_, f64>, ratio: usize) -> Array2<f64> {
    let (rows, cols) = data.dim();
    Array2::from_shape_fn((rows * ratio, cols * ratio), |(r, c)| data[(r / ratio, c / ratio)])
}

/// Per-pixel mean of equally shaped bands.
pub fn band_mean(bands: &[ArrayView2<'_, f64>]) -> Result<Array2<f64>> {
    let first = bands.first().ok_or(Error::EmptyBandSet)?;
    let shape = first.dim();
    let mut sum = Array2::<f64>::zeros(shape);
    for band in bands {
        if band.dim() != shape {
            return Err(Error::mismatch(shape, band.dim()));
        }
        sum += band;
    }
    Ok(sum / bands.len() as f64)
}

/// Sharpen every multispectral band with the panchromatic band.
///
/// Returns one raster per input band, in input order, with the trimmed
/// panchromatic shape and the panchromatic raster's georeferencing.
///
/// # Errors
/// - [`Error::EmptyBandSet`] when `multispectral` is empty
/// - [`Error::DimensionMismatch`] when the multispectral bands differ in
///   shape, or when `ratio` times their trimmed shape is not the trimmed
///   panchromatic shape
/// - [`Error::InvalidParameter`] when `ratio` is 0
pub fn pansharpen(
    pan: &Raster<f64>,
    multispectral: &[&Raster<f64>],
    params: &SharpenParams,
) -> Result<Vec<Raster<f64>>> {
    if params.ratio == 0 {
        return Err(Error::InvalidParameter {
            name: "ratio",
            value: "0".into(),
            reason: "resolution ratio must be at least 1".into(),
        });
    }
    let first = multispectral.first().ok_or(Error::EmptyBandSet)?;
    if let Some(band) = multispectral.iter().find(|b| b.shape() != first.shape()) {
        return Err(Error::mismatch(first.shape(), band.shape()));
    }

    let pan_view = trim_edges(pan.view(), params.edge_trim)?;
    let bands: Vec<ArrayView2<'_, f64>> = multispectral
        .iter()
        .map(|b| trim_edges(b.view(), params.edge_trim))
        .collect::<Result<_>>()?;

    let (ms_rows, ms_cols) = bands[0].dim();
    let upsampled = (
        ms_rows.checked_mul(params.ratio),
        ms_cols.checked_mul(params.ratio),
    );
    if upsampled != (Some(pan_view.nrows()), Some(pan_view.ncols())) {
        return Err(Error::mismatch(
            pan_view.dim(),
            (
                ms_rows.saturating_mul(params.ratio),
                ms_cols.saturating_mul(params.ratio),
            ),
        ));
    }

    let mut smooth = block_replicate(band_mean(&bands)?.view(), params.ratio);
    smooth.mapv_inplace(|v| v + params.epsilon);
    debug!(
        "Pansharpening {} band(s) at {:?} (ratio {})",
        bands.len(),
        pan_view.dim(),
        params.ratio
    );

    (0..bands.len())
        .into_par_iter()
        .map(|i| {
            let upsampled = block_replicate(bands[i], params.ratio);
            let mut sharpened = Array2::<f64>::zeros(pan_view.dim());
            Zip::from(&mut sharpened)
                .and(&pan_view)
                .and(&smooth)
                .and(&upsampled)
                .for_each(|out, &p, &s, &u| *out = p / s * u);
            Ok(pan.with_data(sharpened))
        })
        .collect()
}
