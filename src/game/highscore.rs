//! High-score persistence
//!
//! The engine never touches storage directly. It receives a [`HighScoreStore`]
//! at construction, loads the best score once, and saves only when a finished
//! game beats it.

use log::debug;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to read high score from {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write high score to {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("high score file {path:?} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode high score: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Persistence collaborator for the best score ever achieved
pub trait HighScoreStore {
    fn load(&mut self) -> Result<u32, HighScoreError>;
    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load(&mut self) -> Result<u32, HighScoreError> {
        (**self).load()
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        (**self).save(score)
    }
}

/// Keeps the high score for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    best: u32,
}

impl MemoryHighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }
}

impl HighScoreStore for MemoryHighScore {
    fn load(&mut self) -> Result<u32, HighScoreError> {
        Ok(self.best)
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.best = score;
        Ok(())
    }
}

/// On-disk shape of the high score file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
}

/// Stores the high score as a small JSON document
#[derive(Debug, Clone)]
pub struct JsonFileHighScore {
    path: PathBuf,
}

impl JsonFileHighScore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for JsonFileHighScore {
    /// A missing file means nobody has finished a game yet
    fn load(&mut self) -> Result<u32, HighScoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no high score file at {:?}, starting from 0", self.path);
                return Ok(0);
            }
            Err(source) => {
                return Err(HighScoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let record: HighScoreRecord =
            serde_json::from_str(&json).map_err(|source| HighScoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(record.high_score)
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| HighScoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score: score })
            .map_err(HighScoreError::Encode)?;
        std::fs::write(&self.path, json).map_err(|source| HighScoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
