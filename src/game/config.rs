use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::state::Position;

/// Smallest grid that still leaves room to turn
pub const MIN_GRID_SIZE: usize = 2;
/// Largest grid; keeps coordinates inside `i32` and cell counts far from overflow
pub const MAX_GRID_SIZE: usize = 1024;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per side of the square, wrap-around grid
    pub grid_size: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Starting head cell; `None` puts the head at the grid centre
    pub initial_head: Option<Position>,

    /// Slowest allowed tick rate
    pub min_ticks_per_second: u32,
    /// Fastest allowed tick rate
    pub max_ticks_per_second: u32,
    /// Tick rate of a new engine, clamped into the bounds above
    pub initial_ticks_per_second: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size must be at least 2, got {0}")]
    GridTooSmall(usize),
    #[error("grid size must be at most 1024, got {0}")]
    GridTooLarge(usize),
    #[error("initial snake length must be between 1 and {max}, got {length}")]
    InvalidSnakeLength { length: usize, max: usize },
    #[error("initial head ({x}, {y}) lies outside a {grid_size}x{grid_size} grid")]
    HeadOutOfBounds { x: i32, y: i32, grid_size: usize },
    #[error("invalid tick rate bounds: min {min}, max {max}")]
    InvalidSpeedBounds { min: u32, max: u32 },
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            initial_snake_length: 1,
            initial_head: None,
            min_ticks_per_second: 3,
            max_ticks_per_second: 20,
            initial_ticks_per_second: 8,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Load a configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }

        // A straight snake longer than one row would overlap itself after wrapping
        if self.initial_snake_length == 0 || self.initial_snake_length > self.grid_size {
            return Err(ConfigError::InvalidSnakeLength {
                length: self.initial_snake_length,
                max: self.grid_size,
            });
        }

        if let Some(head) = self.initial_head {
            let size = self.grid_size as i32;
            if head.x < 0 || head.x >= size || head.y < 0 || head.y >= size {
                return Err(ConfigError::HeadOutOfBounds {
                    x: head.x,
                    y: head.y,
                    grid_size: self.grid_size,
                });
            }
        }

        if self.min_ticks_per_second == 0 || self.min_ticks_per_second > self.max_ticks_per_second
        {
            return Err(ConfigError::InvalidSpeedBounds {
                min: self.min_ticks_per_second,
                max: self.max_ticks_per_second,
            });
        }

        Ok(())
    }

    /// Head cell of a freshly reset snake
    pub fn initial_head(&self) -> Position {
        self.initial_head.unwrap_or_else(|| {
            let center = (self.grid_size / 2) as i32;
            Position::new(center, center)
        })
    }

    /// Clamp a requested tick rate into the configured bounds
    pub fn clamp_speed(&self, ticks_per_second: u32) -> u32 {
        ticks_per_second.clamp(self.min_ticks_per_second, self.max_ticks_per_second)
    }
}
