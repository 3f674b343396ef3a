use std::time::{Duration, Instant};

/// Session statistics shown next to the board
pub struct GameMetrics {
    last_update: Instant,
    /// Play time of the current game, excluding pauses
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub last_score: Option<u32>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            elapsed_time: Duration::ZERO,
            games_played: 0,
            last_score: None,
        }
    }

    /// Accumulate wall time since the previous update while the game runs
    pub fn update(&mut self, running: bool) {
        let now = Instant::now();
        if running {
            self.elapsed_time += now - self.last_update;
        }
        self.last_update = now;
    }

    pub fn on_game_start(&mut self) {
        self.last_update = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        self.last_score = Some(final_score);
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
