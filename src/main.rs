use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::{error, info};

use region_grow_rust_lib::config::Config;
use region_grow_rust_lib::dither::TraversalOrder;
use region_grow_rust_lib::image_io::{get_image_files_in_dir, load_image};
use region_grow_rust_lib::pipeline::process_image;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Region-growing image segmentation")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file (defaults are used when omitted)
    #[clap(short, long)]
    config: Option<String>,

    /// Merge cost threshold (overwrites config)
    #[clap(short, long)]
    threshold: Option<f64>,

    /// Segment a 2^N block (overwrites config)
    #[clap(short, long)]
    block_exponent: Option<u32>,

    /// Coordinate order of each sweep (overwrites config)
    #[clap(long)]
    order: Option<OrderArg>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Dither,
    RowMajor,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    if let Some(exponent) = args.block_exponent {
        config.block_exponent = Some(exponent);
        config.max_block_exponent = config.max_block_exponent.max(exponent);
    }

    if let Some(order) = args.order {
        config.traversal_order = match order {
            OrderArg::Dither => TraversalOrder::Dither,
            OrderArg::RowMajor => TraversalOrder::RowMajor,
        };
    }

    config.validate().context("invalid configuration")?;

    let start_time = Instant::now();
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        let input_image = load_image(&input_path)
            .with_context(|| format!("failed to load {}", input_path.display()))?;
        process_image(input_image, &config)?;
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let image_files = get_image_files_in_dir(&input_path)?;
        info!("Found {} image files", image_files.len());

        let mut failures = 0;
        for path in &image_files {
            let result = load_image(path).and_then(|input_image| process_image(input_image, &config));
            if let Err(e) = result {
                error!("Error processing {}: {}", path.display(), e);
                failures += 1;
            }
        }

        if failures > 0 {
            bail!("{} of {} images failed", failures, image_files.len());
        }
    } else {
        bail!("input path {} is neither a file nor a directory", input_path.display());
    }

    info!("Processing completed in {:.2} seconds", start_time.elapsed().as_secs_f64());

    Ok(())
}
