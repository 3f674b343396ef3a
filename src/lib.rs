//! Torus Snake - a terminal Snake game on a wrap-around grid
//!
//! This library provides:
//! - The deterministic simulation engine (game module)
//! - Keyboard decoding (input module)
//! - TUI rendering of state snapshots (render module)
//! - Session statistics (metrics module)
//! - The interactive, timer-driven play loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
