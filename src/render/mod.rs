pub mod renderer;

pub use renderer::{HudStats, Renderer};
