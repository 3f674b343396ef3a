use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};

use crate::game::{GameConfig, GameEngine, HighScoreStore, TickEvent};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{HudStats, Renderer};

/// Interactive play: drives engine ticks from a timer and keys from the terminal
pub struct HumanMode<S: HighScoreStore> {
    engine: GameEngine<S>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    /// Whether the last finished game raised the best score
    new_high_score: bool,
    should_quit: bool,
}

impl<S: HighScoreStore> HumanMode<S> {
    pub fn new(config: GameConfig, store: S) -> Result<Self> {
        let engine = GameEngine::new(config, store).context("Invalid game configuration")?;

        Ok(Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            new_high_score: false,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut scheduled_rate = self.engine.ticks_per_second();
        let mut tick_timer = schedule_ticks(self.engine.tick_interval());

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game();
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update(self.engine.state().is_running());
                    let hud = self.hud_stats();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.engine.state(), &self.metrics, hud);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            // A speed change only reaches the game once the timer is reprogrammed
            if self.engine.ticks_per_second() != scheduled_rate {
                scheduled_rate = self.engine.ticks_per_second();
                tick_timer = schedule_ticks(self.engine.tick_interval());
                info!("tick rate now {scheduled_rate}/s");
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Turn(direction) => {
                self.engine.set_direction(direction);
            }
            KeyAction::StartPause => {
                if self.engine.state().is_game_over() {
                    self.on_game_start();
                }
                self.engine.toggle_pause();
            }
            KeyAction::Restart => {
                self.engine.reset();
                self.on_game_start();
            }
            KeyAction::SpeedUp => {
                let faster = self.engine.ticks_per_second().saturating_add(1);
                self.engine.set_speed(faster);
            }
            KeyAction::SpeedDown => {
                let slower = self.engine.ticks_per_second().saturating_sub(1);
                self.engine.set_speed(slower);
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        if let Some(event) = self.engine.tick() {
            self.on_tick_event(event);
        }
    }

    fn on_tick_event(&mut self, event: TickEvent) {
        match event {
            TickEvent::Collision {
                score,
                new_high_score,
            }
            | TickEvent::BoardFull {
                score,
                new_high_score,
            } => {
                self.new_high_score = new_high_score;
                self.metrics.on_game_over(score);
            }
            TickEvent::Moved | TickEvent::FoodEaten { .. } => {}
        }
    }

    fn on_game_start(&mut self) {
        self.new_high_score = false;
        self.metrics.on_game_start();
    }

    fn hud_stats(&self) -> HudStats {
        HudStats {
            high_score: self.engine.high_score(),
            ticks_per_second: self.engine.ticks_per_second(),
            new_high_score: self.new_high_score,
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Tick timer whose first tick is one full period away
fn schedule_ticks(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameStatus, MemoryHighScore};

    fn mode() -> HumanMode<MemoryHighScore> {
        HumanMode::new(GameConfig::default(), MemoryHighScore::new(5)).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        let mode = mode();
        assert_eq!(mode.engine.state().status, GameStatus::Idle);
        assert_eq!(mode.engine.state().score, 0);
        assert_eq!(mode.hud_stats().high_score, 5);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let result = HumanMode::new(GameConfig::new(0), MemoryHighScore::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_start_pause_toggles() {
        let mut mode = mode();

        mode.apply_action(KeyAction::StartPause);
        assert!(mode.engine.state().is_running());

        mode.apply_action(KeyAction::StartPause);
        assert_eq!(mode.engine.state().status, GameStatus::Paused);
    }

    #[test]
    fn test_ticks_only_move_a_running_snake() {
        let mut mode = mode();
        let head = mode.engine.state().snake.head();

        mode.update_game();
        assert_eq!(mode.engine.state().snake.head(), head);

        mode.apply_action(KeyAction::StartPause);
        mode.apply_action(KeyAction::Turn(Direction::Down));
        mode.update_game();
        assert_ne!(mode.engine.state().snake.head(), head);
        assert_eq!(mode.engine.state().direction(), Direction::Down);
    }

    #[test]
    fn test_speed_keys_are_clamped() {
        let mut mode = mode();

        for _ in 0..50 {
            mode.apply_action(KeyAction::SpeedUp);
        }
        assert_eq!(mode.engine.ticks_per_second(), 20);

        for _ in 0..50 {
            mode.apply_action(KeyAction::SpeedDown);
        }
        assert_eq!(mode.engine.ticks_per_second(), 3);
    }

    #[test]
    fn test_game_reset() {
        let mut mode = mode();
        mode.apply_action(KeyAction::StartPause);
        mode.update_game();

        mode.apply_action(KeyAction::Restart);

        assert_eq!(mode.engine.state().status, GameStatus::Idle);
        assert_eq!(mode.engine.state().steps, 0);
    }

    #[test]
    fn test_game_over_feeds_metrics() {
        let mut mode = mode();
        mode.on_tick_event(TickEvent::Collision {
            score: 3,
            new_high_score: false,
        });

        assert_eq!(mode.metrics.games_played, 1);
        assert_eq!(mode.metrics.last_score, Some(3));
        assert!(!mode.hud_stats().new_high_score);
    }

    #[test]
    fn test_new_high_score_flag_follows_engine() {
        let mut mode = mode();
        mode.on_tick_event(TickEvent::Collision {
            score: 9,
            new_high_score: true,
        });
        assert!(mode.hud_stats().new_high_score);

        mode.apply_action(KeyAction::Restart);
        assert!(!mode.hud_stats().new_high_score);
    }

    #[test]
    fn test_quit() {
        let mut mode = mode();
        mode.apply_action(KeyAction::Quit);
        assert!(mode.should_quit);
    }

    #[tokio::test]
    async fn test_tick_timer_waits_one_period() {
        let start = Instant::now();
        let mut timer = schedule_ticks(Duration::from_millis(20));
        timer.tick().await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
