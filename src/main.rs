use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Logger, Target};
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};
use torus_snake::game::{GameConfig, HighScoreStore, JsonFileHighScore, MemoryHighScore};
use torus_snake::modes::HumanMode;

#[derive(Parser)]
#[command(name = "torus_snake")]
#[command(version, about = "Snake on a wrap-around grid")]
struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the square grid
    #[arg(long)]
    grid_size: Option<usize>,

    /// Initial ticks per second
    #[arg(long)]
    speed: Option<u32>,

    /// Where the high score is kept
    #[arg(long, default_value = "snake_high_score.json")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Write logs to this file (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Logger writing to `log_file`, or `None` when no file was given.
///
/// The game owns stderr, so logging without a file stays off even if
/// `RUST_LOG` is set.
fn file_logger(log_file: Option<&Path>) -> Result<Option<Logger>> {
    let Some(path) = log_file else {
        return Ok(None);
    };

    let file =
        File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    let logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .build();
    Ok(Some(logger))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    if let Some(logger) = file_logger(log_file)? {
        log::set_max_level(logger.filter());
        log::set_boxed_logger(Box::new(logger)).context("Failed to initialise logging")?;
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };

    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(speed) = cli.speed {
        config.initial_ticks_per_second = speed;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    info!("starting with {:?}", config);

    let store: Box<dyn HighScoreStore> = if cli.ephemeral {
        Box::new(MemoryHighScore::default())
    } else {
        Box::new(JsonFileHighScore::new(&cli.high_score_file))
    };

    let mut human_mode = HumanMode::new(config, store)?;
    human_mode.run().await?;

    Ok(())
}
