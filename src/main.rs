use anyhow::Context;
use clap::Parser;
use image_comp::DEFAULT_MIN_AREA;
use image_comp::batch::{BatchConfig, run_batch};
use image_comp::pipeline::{PipelineConfig, Threshold};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_ROOT: &str = "test_cases";

/// Analyzes differences between pairs of images in test case folders.
#[derive(Parser, Debug)]
#[command(
    name = "image_comp",
    version,
    after_help = "Example usage: image_comp --root path/to/test_cases --threshold 30"
)]
struct Cli {
    /// Root folder containing test case subfolders, each holding exactly two images.
    #[arg(short, long, default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// Threshold for significant differences (0-255). Higher values detect only more
    /// significant changes.
    #[arg(short, long, default_value_t = 50, allow_negative_numbers = true)]
    threshold: i64,

    /// Changes must cover more than this many pixels to be reported.
    #[arg(short, long, default_value_t = DEFAULT_MIN_AREA)]
    min_area: usize,

    /// Number of image pairs compared in parallel. Defaults to the CPU count.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Also write a JSON summary of every test case to this file.
    #[arg(long)]
    summary: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let threshold = Threshold::try_from(cli.threshold)?;

    let mut config = BatchConfig::new(cli.root.clone());
    config.pipeline = PipelineConfig {
        threshold,
        min_area: cli.min_area,
    };
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    config.summary_path = cli.summary;

    let outcomes = run_batch(&config)
        .await
        .with_context(|| format!("failed to process test cases under {}", cli.root.display()))?;

    for outcome in &outcomes {
        println!("Results for test case: {}", outcome.name);
        println!(
            "Thresholded difference image saved as: {}",
            outcome.diff_image.display()
        );
        println!("Number of significant changes: {}", outcome.num_changes);
        println!(
            "Pixel counts for each significant change are located in: {}\n",
            outcome.changes_csv.display()
        );
    }

    Ok(())
}
