use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta on a toroidal grid with `grid_size` cells per side
    pub fn wrapped_by(&self, dx: i32, dy: i32, grid_size: usize) -> Self {
        let size = grid_size as i32;
        Self {
            x: (self.x + dx).rem_euclid(size),
            y: (self.y + dy).rem_euclid(size),
        }
    }

    /// Step one cell in a direction, re-entering from the opposite edge
    pub fn wrapped_step(&self, direction: Direction, grid_size: usize) -> Self {
        let (dx, dy) = direction.delta();
        self.wrapped_by(dx, dy, grid_size)
    }
}

/// Every cell of a square grid, row by row
pub fn grid_cells(grid_size: usize) -> impl Iterator<Item = Position> {
    let size = grid_size as i32;
    (0..size).flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Direction applied by the most recent tick
    pub direction: Direction,
}

impl Snake {
    /// Create a snake whose extra segments trail behind the head, wrapping at the edges
    pub fn new(head: Position, direction: Direction, length: usize, grid_size: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.wrapped_by(-dx, -dy, grid_size));
        }

        Self { body, direction }
    }

    /// Build a snake from explicit head-first segments
    pub fn from_body(body: Vec<Position>, direction: Direction) -> Self {
        debug_assert!(!body.is_empty(), "snake needs at least a head");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Linear scan over every segment, tail included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Prepend a new head, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Freshly reset, waiting for `start`
    Idle,
    Running,
    Paused,
    /// The snake ran into itself
    GameOver,
    /// The snake covers every cell, so no food can be placed
    BoardFull,
}

impl GameStatus {
    /// Terminal states stay put until an explicit start or reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::BoardFull)
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Direction the next tick will apply
    pub pending_direction: Direction,
    /// `None` only once the board is full
    pub food: Option<Position>,
    pub grid_size: usize,
    pub score: u32,
    pub steps: u32,
    pub status: GameStatus,
}

impl GameState {
    /// Create a new, idle game state
    pub fn new(snake: Snake, food: Option<Position>, grid_size: usize) -> Self {
        let pending_direction = snake.direction;
        Self {
            snake,
            pending_direction,
            food,
            grid_size,
            score: 0,
            steps: 0,
            status: GameStatus::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Direction applied by the most recent tick
    pub fn direction(&self) -> Direction {
        self.snake.direction
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Cells not covered by the snake
    pub fn free_cells(&self) -> impl Iterator<Item = Position> + '_ {
        grid_cells(self.grid_size).filter(|pos| !self.snake.occupies(*pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.wrapped_by(1, 0, 20), Position::new(6, 5));
        assert_eq!(pos.wrapped_by(0, -1, 20), Position::new(5, 4));

        let right_edge = Position::new(19, 7);
        assert_eq!(
            right_edge.wrapped_step(Direction::Right, 20),
            Position::new(0, 7)
        );

        let top_left = Position::new(0, 0);
        assert_eq!(
            top_left.wrapped_step(Direction::Left, 20),
            Position::new(19, 0)
        );
        assert_eq!(
            top_left.wrapped_step(Direction::Up, 20),
            Position::new(0, 19)
        );
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3, 20);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.body[1], Position::new(4, 5));
        assert_eq!(snake.tail(), Position::new(3, 5));
    }

    #[test]
    fn test_snake_creation_wraps_behind_head() {
        let snake = Snake::new(Position::new(1, 3), Direction::Right, 3, 10);
        assert_eq!(
            snake.body,
            vec![Position::new(1, 3), Position::new(0, 3), Position::new(9, 3)]
        );
    }

    #[test]
    fn test_snake_advance() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3, 20);

        snake.advance(Position::new(6, 5), false);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));
        assert_eq!(snake.tail(), Position::new(4, 5));

        snake.advance(Position::new(7, 5), true);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), Position::new(7, 5));
        assert_eq!(snake.tail(), Position::new(4, 5));
    }

    #[test]
    fn test_occupancy_includes_head_and_tail() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3, 20);
        assert!(snake.occupies(Position::new(5, 5)));
        assert!(snake.occupies(Position::new(3, 5)));
        assert!(!snake.occupies(Position::new(10, 10)));
    }

    #[test]
    fn test_free_cells() {
        let snake = Snake::from_body(
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)],
            Direction::Left,
        );
        let state = GameState::new(snake, None, 2);

        let free: Vec<_> = state.free_cells().collect();
        assert_eq!(free, vec![Position::new(0, 1)]);
        assert_eq!(state.cell_count(), 4);
        assert_eq!(grid_cells(3).count(), 9);
    }

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 1, 20),
            Some(Position::new(1, 1)),
            20,
        );

        assert_eq!(state.status, GameStatus::Idle);
        assert_eq!(state.pending_direction, Direction::Right);
        assert!(!state.is_running());
        assert!(!state.is_game_over());
        assert!(GameStatus::BoardFull.is_terminal());
        assert!(!GameStatus::Paused.is_terminal());
    }
}
