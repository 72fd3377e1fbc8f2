//! chromasom CLI - Self-Organizing Map trainer
//!
//! Trains a SOM on three columns of a CSV file and saves the trained grid as
//! an RGB image.

use chromasom::config::DEFAULT_CONFIG_FILE;
use chromasom::{load_samples, save_grid_image, Config, Result, SomTrainer};
use clap::Parser;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "chromasom")]
#[command(version)]
#[command(about = "Run a SOM on tabular data and generate a clustering image", long_about = None)]
struct Cli {
    /// Path to the input CSV file
    data_file: PathBuf,

    /// Columns to use as input features (exactly three)
    #[arg(required = true, num_args = 1..)]
    data_columns: Vec<String>,

    /// YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output image (overrides output.path from the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Random seed for reproducibility (overrides som.seed)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pixels per grid cell (overrides output.scale)
    #[arg(long)]
    scale: Option<u32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    if let Err(e) = run(cli) {
        error!("An error occurred: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Loading configuration...");
    let mut config = Config::from_file(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.som.seed = Some(seed);
    }
    if let Some(scale) = cli.scale {
        config.output.scale = scale;
    }
    let output = cli.output.unwrap_or_else(|| config.output.path.clone());
    config.validate()?;

    info!("Loading data from CSV...");
    let samples = load_samples(&cli.data_file, &cli.data_columns)?;

    let som = &config.som;
    info!(
        "Initializing SOM with grid size {}x{} and {} iterations.",
        som.grid_width, som.grid_height, som.max_iterations
    );
    let mut trainer = SomTrainer::new(som.clone())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Training SOM...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let start_time = Instant::now();
    let trained = trainer.train_with_callback(&samples, |iteration, total| {
        pb.set_message(format!("Training SOM (iteration {}/{})...", iteration + 1, total));
    });
    pb.finish_and_clear();
    trained?;
    let elapsed = start_time.elapsed();
    info!(
        "SOM training completed in {:.2} seconds ({}).",
        elapsed.as_secs_f64(),
        HumanDuration(elapsed)
    );

    let grid = trainer.grid();
    if let Some(first) = trainer.metrics().quantization_errors.first() {
        info!(
            "Quantization error: {:.4} after the first iteration, {:.4} after training.",
            first,
            grid.quantization_error(&samples)?
        );
    }

    info!("Saving the resulting image to {}", output.display());
    save_grid_image(grid, &output, config.output.scale)?;

    info!("SOM process complete.");
    Ok(())
}
