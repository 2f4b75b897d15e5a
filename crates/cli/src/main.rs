//! eofuse CLI - EO-1 scene products

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use eofuse_algorithms::imagery::{SharpenParams, StretchParams};
use eofuse_algorithms::products::{create_pansharpened, create_rgb};
use eofuse_algorithms::statistics::nonzero_percentiles;
use eofuse_core::bands::channel_name;
use eofuse_core::feed::FeedEntry;
use eofuse_core::io::{DefaultDriver, RasterSource};
use eofuse_core::{BandResolver, Error, Raster, SceneId, SceneLayout};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "eofuse")]
#[command(author, version, about = "EO-1 ALI/Hyperion RGB composites and pansharpening", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Root of the EO-1 scene archive
    #[arg(long, global = true, env = "EOFUSE_BASE_DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a stretched 8-bit RGB composite of a scene
    Rgb {
        /// Scene identifier, e.g. EO1A1930292014029110PZ
        #[arg(value_parser = parse_scene)]
        scene_id: SceneId,
        /// Output GeoTIFF
        output: PathBuf,
        /// Brightening factor applied after the stretch
        #[arg(default_value = "1.0", value_parser = parse_scale)]
        scale_factor: f64,
    },
    /// Pansharpen the multispectral bands of an ALI scene
    Pansharpen {
        /// Scene identifier (ALI only)
        #[arg(value_parser = parse_scene)]
        scene_id: SceneId,
        /// Directory receiving one GeoTIFF per sharpened band
        output_dir: PathBuf,
    },
    /// Print an Atom feed entry describing a georeferenced image
    FeedEntry {
        /// Input raster file
        image: PathBuf,
        /// Optional entry description
        description: Option<String>,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn parse_scene(s: &str) -> std::result::Result<SceneId, String> {
    SceneId::parse(s).map_err(|e| e.to_string())
}

fn parse_scale(s: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(v) => Err(format!("scale factor must be positive, got {}", v)),
        Err(e) => Err(e.to_string()),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn resolver(scene: SceneId, base_dir: Option<&Path>) -> BandResolver<DefaultDriver> {
    let mut layout = SceneLayout::for_scene(&scene);
    if let Some(base) = base_dir {
        layout = layout.with_base_path(base);
    }
    debug!("Scene directory: {}", layout.scene_dir(&scene).display());
    BandResolver::new(DefaultDriver::default(), layout, scene)
}

fn read_raster(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster = DefaultDriver::default()
        .open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<()> {
    let base_dir = cli.base_dir.as_deref();

    match cli.command {
        Commands::Rgb {
            scene_id,
            output,
            scale_factor,
        } => {
            let start = Instant::now();
            let resolver = resolver(scene_id, base_dir);
            let pb = spinner("Building RGB composite...");
            let result = create_rgb(
                &resolver,
                &DefaultDriver::default(),
                &output,
                &StretchParams::with_scale(scale_factor),
            );
            pb.finish_and_clear();
            let report = result.context("Failed to build RGB composite")?;
            println!("Bands (R, G, B): {:?}", report.bands);
            done("RGB composite", &output, start.elapsed());
        }

        Commands::Pansharpen {
            scene_id,
            output_dir,
        } => {
            let start = Instant::now();
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;
            let resolver = resolver(scene_id, base_dir);
            let pb = spinner("Pansharpening...");
            let result = create_pansharpened(
                &resolver,
                &DefaultDriver::default(),
                &output_dir,
                &SharpenParams::default(),
            );
            pb.finish_and_clear();
            let report = result.context("Failed to pansharpen scene")?;
            for path in &report.outputs {
                println!("  {}", path.display());
            }
            if !report.skipped.is_empty() {
                println!("Skipped bands: {:?}", report.skipped);
            }
            done("Pansharpened bands", &output_dir, start.elapsed());
        }

        Commands::FeedEntry { image, description } => {
            let raster = read_raster(&image)?;
            let entry = FeedEntry::from_raster(FeedEntry::layer_name(&image), &raster, description)
                .context("Failed to describe image")?;
            println!("{}", entry.to_xml()?);
        }

        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            println!("\nStatistics (nonzero samples):");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            if let Some((p1, p97)) = nonzero_percentiles(raster.view(), 1.0, 97.0) {
                println!("  P1: {:.4}", p1);
                println!("  P97: {:.4}", p97);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Error>() {
                Some(Error::BandNotFound { channel, attempted }) => {
                    eprintln!(
                        "No viable band found for {} component (tried bands {:?})",
                        channel_name(*channel),
                        attempted
                    );
                }
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
