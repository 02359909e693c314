//! # Delve Command Line
//!
//! Generates a level and prints it as ASCII art or JSON.

use clap::Parser;
use delve::{Algorithm, DelveError, DelveResult, GenerationConfig, MapGenerator};
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon level generator")]
#[command(version)]
struct Args {
    /// JSON file with generation settings; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for level generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level width in tiles
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Level height in tiles
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Layout strategy
    #[arg(short, long, value_enum)]
    algorithm: Option<Algorithm>,

    /// Depth of the generated level
    #[arg(short, long, default_value = "1")]
    depth: u32,

    /// Share of the map the blob generator fills
    #[arg(long)]
    fill_rate: Option<f64>,

    /// Points the path generator threads corridors through
    #[arg(long)]
    points: Option<u32>,

    /// Print the level as JSON instead of ASCII
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;
    info!("Starting Delve v{}", delve::VERSION);

    let config = build_config(&args)?;
    info!(
        "Generating {:?} level {} ({}x{}) with seed {}",
        config.algorithm, args.depth, config.width, config.height, config.seed
    );

    let mut rng = delve::generation::utils::create_rng(&config);
    let level = MapGenerator::new(config).generate_level(args.depth, &mut rng)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&level)?);
    } else {
        print!("{}", level.grid);
    }
    Ok(())
}

/// Starts from the config file (or defaults) and applies flag overrides.
fn build_config(args: &Args) -> DelveResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::new(rand::random()),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(fill_rate) = args.fill_rate {
        config.fill_rate = fill_rate;
    }
    if let Some(points) = args.points {
        config.path_points = points;
    }
    Ok(config)
}

/// Initializes env_logger at `log_level`; `RUST_LOG` takes precedence when set.
fn initialize_logging(log_level: &str) -> DelveResult<()> {
    let level: LevelFilter = log_level
        .parse()
        .map_err(|_| DelveError::InvalidConfig(format!("Unknown log level '{}'", log_level)))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.to_string()))
        .format_target(false)
        .init();
    Ok(())
}
