//! Scene-level products
//!
//! Each driver resolves the bands of one scene, runs the imagery
//! algorithms and hands the result to a [`RasterWriter`]. Nothing is
//! written unless every required band was found.

use crate::imagery::{compose, pansharpen, stretch_bands, SharpenParams, StretchParams};
use eofuse_core::bands::{BandId, BandResolver, BandSpec};
use eofuse_core::io::{RasterSource, RasterWriter, WriteOptions};
use eofuse_core::raster::{MultiBandRaster, Raster};
use eofuse_core::scene::Instrument;
use eofuse_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Panchromatic band of an ALI scene
pub const ALI_PAN_BAND: BandId = 1;

/// Multispectral ALI bands sharpened by [`create_pansharpened`]
pub const ALI_MULTISPECTRAL_BANDS: std::ops::RangeInclusive<BandId> = 2..=10;

/// Outcome of [`create_rgb`]
#[derive(Debug, Clone, PartialEq)]
pub struct RgbReport {
    /// Band used for R, G and B
    pub bands: [BandId; 3],
    /// Written composite
    pub output: PathBuf,
    /// Composite size as (rows, cols)
    pub shape: (usize, usize),
}

/// Outcome of [`create_pansharpened`]
#[derive(Debug, Clone, PartialEq)]
pub struct PansharpenReport {
    /// Multispectral bands that were sharpened, in output order
    pub bands: Vec<BandId>,
    /// Multispectral bands that could not be opened
    pub skipped: Vec<BandId>,
    /// Written files, one per entry of `bands`
    pub outputs: Vec<PathBuf>,
}

/// Build the stretched RGB composite of a scene.
///
/// Resolves the instrument's default R, G, B specs in order, stretches
/// each resolved band and writes the stack with the georeferencing of the
/// red band. A channel with no openable candidate aborts the run with
/// [`Error::BandNotFound`] before anything is written.
pub fn create_rgb<S, W>(
    resolver: &BandResolver<S>,
    writer: &W,
    output: &Path,
    params: &StretchParams,
) -> Result<RgbReport>
where
    S: RasterSource,
    W: RasterWriter,
{
    let start = Instant::now();
    let specs = BandSpec::rgb_defaults(resolver.scene().instrument());
    let resolved = resolver.resolve(&specs)?;

    let bands = [resolved[0].band, resolved[1].band, resolved[2].band];
    let sources: Vec<&Raster<f64>> = resolved.iter().map(|r| &r.raster).collect();
    let stretched = stretch_bands(&sources, params)?;

    let composite = compose(&stretched, &resolved[0].raster)?;
    writer.write(&composite, output, &WriteOptions::rgb_composite())?;

    info!(
        "Wrote RGB composite of {} (bands {:?}) to {} in {:.2?}",
        resolver.scene(),
        bands,
        output.display(),
        start.elapsed()
    );
    Ok(RgbReport {
        bands,
        output: output.to_path_buf(),
        shape: composite.shape(),
    })
}

/// Pansharpen every available multispectral band of an ALI scene.
///
/// The panchromatic band is required. Multispectral bands that cannot be
/// opened are skipped with a warning. Each sharpened band is written to
/// `out_dir` as a float raster named like its source band file.
pub fn create_pansharpened<S, W>(
    resolver: &BandResolver<S>,
    writer: &W,
    out_dir: &Path,
    params: &SharpenParams,
) -> Result<PansharpenReport>
where
    S: RasterSource,
    W: RasterWriter,
{
    let start = Instant::now();
    let scene = resolver.scene();
    if scene.instrument() != Instrument::Ali {
        return Err(Error::UnsupportedInstrument {
            instrument: scene.instrument().to_string(),
            operation: "pansharpen",
        });
    }

    let pan = resolver.resolve_channel(0, &BandSpec::single(ALI_PAN_BAND))?.raster;

    let mut bands = Vec::new();
    let mut skipped = Vec::new();
    let mut multispectral = Vec::new();
    for band in ALI_MULTISPECTRAL_BANDS {
        match resolver.open_band(band) {
            Ok(raster) => {
                bands.push(band);
                multispectral.push(raster);
            }
            Err(e) => {
                warn!("Skipping band {} of {}: {}", band, scene, e);
                skipped.push(band);
            }
        }
    }

    let refs: Vec<&Raster<f64>> = multispectral.iter().collect();
    let sharpened = pansharpen(&pan, &refs, params)?;

    let mut outputs = Vec::with_capacity(sharpened.len());
    for (band, raster) in bands.iter().zip(sharpened) {
        let path = out_dir.join(resolver.layout().band_file_name(scene, *band));
        writer.write(&MultiBandRaster::from_raster(raster), &path, &WriteOptions::float_band())?;
        info!("Band {}: wrote {}", band, path.display());
        outputs.push(path);
    }

    info!(
        "Pansharpened {} band(s) of {} in {:.2?}",
        outputs.len(),
        scene,
        start.elapsed()
    );
    Ok(PansharpenReport {
        bands,
        skipped,
        outputs,
    })
}
