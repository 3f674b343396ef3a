use log::{debug, info, warn};
use rand::{Rng, rngs::ThreadRng, seq::IteratorRandom};
use std::time::Duration;

use super::{
    config::{ConfigError, GameConfig},
    direction::Direction,
    highscore::HighScoreStore,
    state::{GameState, GameStatus, Position, Snake},
};

/// Random samples per grid cell before food placement falls back to
/// enumerating the free cells
const FOOD_SAMPLES_PER_CELL: usize = 4;

/// What a tick that actually ran did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// The snake moved one cell, length unchanged
    Moved,
    /// The snake ate and grew by one
    FoodEaten { score: u32 },
    /// The snake ran into itself; the game is over
    Collision { score: u32, new_high_score: bool },
    /// The snake covers the whole grid
    BoardFull { score: u32, new_high_score: bool },
}

impl TickEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TickEvent::Collision { .. } | TickEvent::BoardFull { .. }
        )
    }
}

/// The simulation engine: sole owner and mutator of the game state
pub struct GameEngine<S, R = ThreadRng> {
    config: GameConfig,
    state: GameState,
    store: S,
    high_score: u32,
    ticks_per_second: u32,
    rng: R,
}

impl<S: HighScoreStore> GameEngine<S> {
    /// Create a new game engine backed by the thread-local RNG
    pub fn new(config: GameConfig, store: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, rand::thread_rng())
    }
}

impl<S: HighScoreStore, R: Rng> GameEngine<S, R> {
    /// Create a game engine with an explicit RNG, e.g. a seeded one for replays
    pub fn with_rng(config: GameConfig, mut store: S, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let high_score = match store.load() {
            Ok(score) => score,
            Err(error) => {
                warn!("could not load high score, starting from 0: {error}");
                0
            }
        };

        let state = fresh_state(&config, &mut rng);
        let ticks_per_second = config.clamp_speed(config.initial_ticks_per_second);

        Ok(Self {
            config,
            state,
            store,
            high_score,
            ticks_per_second,
            rng,
        })
    }

    /// Read-only snapshot for renderers
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn high_score_store(&self) -> &S {
        &self.store
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Time between two scheduled ticks at the current rate
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second
    }

    /// Buffer a direction for the next tick.
    ///
    /// The request is checked against the direction the last tick applied,
    /// not against an earlier buffered request, so two quick presses can never
    /// reverse the snake into its own neck. Returns whether it was accepted.
    pub fn set_direction(&mut self, requested: Direction) -> bool {
        if self.state.snake.direction.is_opposite(requested) {
            debug!(
                "ignoring {:?}: opposite of {:?}",
                requested, self.state.snake.direction
            );
            return false;
        }

        self.state.pending_direction = requested;
        true
    }

    /// Advance the simulation by one step. `None` when the game is not running.
    pub fn tick(&mut self) -> Option<TickEvent> {
        if !self.state.is_running() {
            return None;
        }

        let direction = self.state.pending_direction;
        let new_head = self
            .state
            .snake
            .head()
            .wrapped_step(direction, self.config.grid_size);

        // Collision leaves snake, food and score exactly as they were
        if self.state.snake.occupies(new_head) {
            self.state.status = GameStatus::GameOver;
            let score = self.state.score;
            let new_high_score = self.record_high_score();
            info!("game over at {:?} with score {score}", new_head);
            return Some(TickEvent::Collision {
                score,
                new_high_score,
            });
        }

        let ate_food = self.state.food == Some(new_head);
        self.state.snake.direction = direction;
        self.state.snake.advance(new_head, ate_food);
        self.state.steps += 1;

        if !ate_food {
            return Some(TickEvent::Moved);
        }

        self.state.score += 1;
        let score = self.state.score;

        match place_food(&mut self.rng, &self.state) {
            Some(food) => {
                debug!("food eaten, score {score}, next food at {:?}", food);
                self.state.food = Some(food);
                Some(TickEvent::FoodEaten { score })
            }
            None => {
                self.state.food = None;
                self.state.status = GameStatus::BoardFull;
                let new_high_score = self.record_high_score();
                info!("board full with score {score}");
                Some(TickEvent::BoardFull {
                    score,
                    new_high_score,
                })
            }
        }
    }

    /// Run the game, resetting first if the previous one has ended
    pub fn start(&mut self) {
        if self.state.status.is_terminal() {
            self.reset();
        }
        self.state.status = GameStatus::Running;
    }

    /// Stop ticking; only a running game can be paused
    pub fn pause(&mut self) {
        if self.state.status == GameStatus::Running {
            self.state.status = GameStatus::Paused;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.state.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Replace the game state with a fresh idle one. High score and speed survive.
    pub fn reset(&mut self) {
        self.state = fresh_state(&self.config, &mut self.rng);
        info!("game reset");
    }

    /// Set the tick rate, clamped to the configured bounds. Returns the applied rate.
    pub fn set_speed(&mut self, ticks_per_second: u32) -> u32 {
        let applied = self.config.clamp_speed(ticks_per_second);
        if applied != ticks_per_second {
            debug!("speed {ticks_per_second} clamped to {applied}");
        }
        self.ticks_per_second = applied;
        applied
    }

    /// Persist the current score if it beats the best one
    fn record_high_score(&mut self) -> bool {
        let score = self.state.score;
        if score <= self.high_score {
            return false;
        }

        self.high_score = score;
        match self.store.save(score) {
            Ok(()) => info!("new high score {score}"),
            Err(error) => warn!("failed to persist high score {score}: {error}"),
        }
        true
    }
}

fn fresh_state<R: Rng>(config: &GameConfig, rng: &mut R) -> GameState {
    let snake = Snake::new(
        config.initial_head(),
        Direction::Right,
        config.initial_snake_length,
        config.grid_size,
    );
    let mut state = GameState::new(snake, None, config.grid_size);
    state.food = place_food(rng, &state);

    state
}

/// Pick a uniformly random cell not covered by the snake, or `None` if there is none
fn place_food<R: Rng>(rng: &mut R, state: &GameState) -> Option<Position> {
    let cells = state.cell_count();
    if state.snake.len() >= cells {
        return None;
    }

    for _ in 0..cells * FOOD_SAMPLES_PER_CELL {
        let x = rng.gen_range(0..state.grid_size) as i32;
        let y = rng.gen_range(0..state.grid_size) as i32;
        let pos = Position::new(x, y);

        if !state.snake.occupies(pos) {
            return Some(pos);
        }
    }

    state.free_cells().choose(rng)
}
