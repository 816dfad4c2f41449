use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueHint};
use log::{info, warn};
use pixel_sorter::core_modules::utils::image_helper::image_helper;
use pixel_sorter::pipeline::{DEFAULT_NOISE, SortConfig, SortMode, SortPipeline, progress_glyph};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sort_runner",
    version,
    about = "Reorder an image's pixels by run sorting (mode 0) or neighbor diffusion (mode 1)"
)]
struct Cli {
    /// Source image path
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,
    /// Destination image path, always written as PNG
    #[arg(value_hint = ValueHint::FilePath)]
    destination: PathBuf,
    /// 0 = segment and sort columns, 1 = neighbor diffusion
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    mode: u8,
    /// Tolerance (mode 0, float) or search radius (mode 1, integer)
    parameter: Option<String>,
    /// Number of diffusion iterations (mode 1)
    iterations: Option<usize>,

    /// Penalty added to a pixel's own score in diffusion
    #[arg(long, default_value_t = DEFAULT_NOISE)]
    noise: u32,
    /// Seed for the random traversal orders
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,
}

fn invalid(message: String) -> clap::Error {
    Cli::command().error(ErrorKind::ValueValidation, message)
}

/// Resolves the positional parameters into a mode and a configuration.
/// The meaning of the fourth argument depends on the mode.
fn build_config(cli: &Cli) -> Result<(SortMode, SortConfig), clap::Error> {
    let mode = SortMode::try_from(cli.mode).map_err(|e| invalid(e.to_string()))?;
    let mut config = SortConfig {
        noise: cli.noise,
        seed: cli.seed,
        ..SortConfig::default()
    };

    if let Some(raw) = &cli.parameter {
        match mode {
            SortMode::Segment => {
                config.tolerance = raw
                    .parse()
                    .map_err(|_| invalid(format!("tolerance must be a number, got {raw:?}")))?;
            }
            SortMode::Diffusion => {
                config.search_radius = raw.parse().map_err(|_| {
                    invalid(format!("search radius must be a non-negative integer, got {raw:?}"))
                })?;
            }
        }
    }

    if let Some(iterations) = cli.iterations {
        if mode == SortMode::Segment {
            warn!("iterations only apply to mode 1; ignoring {iterations}");
        }
        config.iterations = iterations;
    }

    Ok((mode, config))
}

fn main() -> Result<()> {
    // --- 1. Argument Parsing & Setup ---
    env_logger::init();
    let cli = Cli::parse();
    let (mode, config) = build_config(&cli).unwrap_or_else(|e| e.exit());

    // --- 2. Runtime ---
    // Column jobs are CPU-bound and run on the blocking pool; cap it at the core count.
    let threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .max_blocking_threads(threads)
        .enable_all()
        .build()
        .context("failed to start the worker runtime")?;

    runtime.block_on(run(cli, mode, config))
}

async fn run(cli: Cli, mode: SortMode, config: SortConfig) -> Result<()> {
    info!("source: {}", cli.source.display());
    info!("destination: {}", cli.destination.display());
    info!(
        "mode: {mode:?}, tolerance: {}, radius: {}, iterations: {}",
        config.tolerance, config.search_radius, config.iterations
    );

    // --- 3. Decode ---
    let (grid, format) = image_helper::load(&cli.source)
        .with_context(|| format!("failed to read {}", cli.source.display()))?;
    info!("decoded {format:?} image, {}x{}", grid.width(), grid.height());

    // --- 4. Pixel Reordering ---
    let pipeline = SortPipeline::new(mode, config).context("invalid configuration")?;
    let sorted = pipeline
        .process_with_progress(grid, |completed| {
            print!("{}", progress_glyph(completed));
            let _ = std::io::stdout().flush();
        })
        .await
        .context("pixel reordering failed")?;
    if mode == SortMode::Diffusion {
        println!();
    }

    // --- 5. Encode ---
    image_helper::save(&cli.destination, &sorted)
        .with_context(|| format!("failed to write {}", cli.destination.display()))?;

    println!("Processing complete. Output saved to {}", cli.destination.display());
    Ok(())
}
