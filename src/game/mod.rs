//! Core game logic module for Snake
//!
//! This module contains the wrap-around simulation engine without any I/O or
//! rendering dependencies. Storage of the high score is reached only through
//! the [`HighScoreStore`] trait.

pub mod config;
pub mod direction;
pub mod engine;
pub mod highscore;
pub mod state;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use direction::Direction;
pub use engine::{GameEngine, TickEvent};
pub use highscore::{HighScoreError, HighScoreStore, JsonFileHighScore, MemoryHighScore};
pub use state::{GameState, GameStatus, Position, Snake};
