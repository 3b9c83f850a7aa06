//! The simulation collaborator: the narrow contract the loop drives, and the
//! grid engine that ships with the game.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GridVector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn unit(self) -> GridVector {
        let (dx, dy) = self.offset();
        GridVector::new(dx as f64, dy as f64)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("elapsed time must be finite and non-negative, got {0} ms")]
    InvalidElapsed(f64),
    #[error("board dimensions must be positive, got {width}x{height}")]
    EmptyBoard { width: u32, height: u32 },
    #[error("initial length {length} must be between 1 and {max}")]
    InvalidLength { length: u32, max: u32 },
    #[error("initial speed must be finite and positive, got {0}")]
    InvalidSpeed(f64),
}

/// Everything needed to (re)create an engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub width: u32,
    pub height: u32,
    pub initial_length: u32,
    /// Grid units per millisecond.
    pub initial_speed: f64,
    pub initial_direction: Direction,
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::EmptyBoard { width: self.width, height: self.height });
        }
        let max = self.width.min(self.height);
        if self.initial_length == 0 || self.initial_length > max {
            return Err(EngineError::InvalidLength { length: self.initial_length, max });
        }
        if !self.initial_speed.is_finite() || self.initial_speed <= 0.0 {
            return Err(EngineError::InvalidSpeed(self.initial_speed));
        }
        Ok(())
    }
}

/// Read-only copy of the engine state at one instant. The body is head-first.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub board_width: u32,
    pub board_height: u32,
    pub body: Vec<GridVector>,
    pub heading: Direction,
    pub speed: f64,
    pub food: GridVector,
    pub score: u32,
    pub over: bool,
}

pub trait Engine {
    /// Pending heading for the next advance. `None` keeps the previous heading.
    fn set_input_direction(&mut self, direction: Option<Direction>);

    fn run_for(&mut self, elapsed_ms: f64) -> Result<(), EngineError>;

    fn score(&self) -> u32;

    fn is_over(&self) -> bool;

    fn snapshot(&self) -> Snapshot;
}

type Cell = (i32, i32);

/// Cell-stepping snake: moves one cell each time the accumulated
/// `speed * elapsed` distance crosses a whole unit.
pub struct GridEngine {
    width: i32,
    height: i32,
    snake: VecDeque<Cell>,
    heading: Direction,
    pending: Option<Direction>,
    speed: f64,
    progress: f64,
    food: Cell,
    score: u32,
    over: bool,
    rng: SmallRng,
}

impl GridEngine {
    /// Settings are expected to have passed [`EngineSettings::validate`].
    pub fn new(settings: &EngineSettings) -> Self {
        Self::with_rng(settings, SmallRng::from_entropy())
    }

    #[cfg(test)]
    pub fn with_seed(settings: &EngineSettings, seed: u64) -> Self {
        Self::with_rng(settings, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(settings: &EngineSettings, rng: SmallRng) -> Self {
        let width = settings.width as i32;
        let height = settings.height as i32;
        let length = settings.initial_length.max(1) as i32;
        let (dx, dy) = settings.initial_direction.offset();

        // Start centred, shifted along the heading axis until the tail fits.
        let mut head = (width / 2, height / 2);
        let tail = (head.0 - dx * (length - 1), head.1 - dy * (length - 1));
        head.0 -= tail.0.min(0) + (tail.0 - (width - 1)).max(0);
        head.1 -= tail.1.min(0) + (tail.1 - (height - 1)).max(0);

        let snake = (0..length).map(|i| (head.0 - dx * i, head.1 - dy * i)).collect();

        let mut engine = Self {
            width,
            height,
            snake,
            heading: settings.initial_direction,
            pending: None,
            speed: settings.initial_speed,
            progress: 0.0,
            food: (0, 0),
            score: 0,
            over: false,
            rng,
        };
        engine.place_food();
        engine
    }

    fn place_food(&mut self) {
        let free: Vec<Cell> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|cell| !self.snake.contains(cell))
            .collect();
        match free.choose(&mut self.rng) {
            Some(&cell) => self.food = cell,
            // Board is full.
            None => self.over = true,
        }
    }

    fn head(&self) -> Cell {
        self.snake.front().copied().unwrap_or((0, 0))
    }

    /// Heading the snake will take on its next step.
    fn next_heading(&self) -> Direction {
        match self.pending {
            Some(next) if next != self.heading.opposite() => next,
            _ => self.heading,
        }
    }

    fn step(&mut self) {
        self.heading = self.next_heading();
        self.pending = None;

        let head = self.head();
        let (dx, dy) = self.heading.offset();
        let new_head = (head.0 + dx, head.1 + dy);

        if new_head.0 < 0 || new_head.0 >= self.width || new_head.1 < 0 || new_head.1 >= self.height {
            self.over = true;
            return;
        }

        let eats = new_head == self.food;
        // The tail cell is vacated this step unless the snake grows.
        let occupied = if eats { self.snake.len() } else { self.snake.len() - 1 };
        if self.snake.iter().take(occupied).any(|&cell| cell == new_head) {
            self.over = true;
            return;
        }

        self.snake.push_front(new_head);
        if eats {
            self.score += 1;
            self.place_food();
        } else {
            self.snake.pop_back();
        }
    }
}

impl Engine for GridEngine {
    fn set_input_direction(&mut self, direction: Option<Direction>) {
        if direction.is_some() {
            self.pending = direction;
        }
    }

    fn run_for(&mut self, elapsed_ms: f64) -> Result<(), EngineError> {
        if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
            return Err(EngineError::InvalidElapsed(elapsed_ms));
        }
        if self.over {
            return Ok(());
        }

        self.progress += self.speed * elapsed_ms;
        while self.progress >= 1.0 && !self.over {
            self.progress -= 1.0;
            self.step();
        }
        if self.over {
            self.progress = 0.0;
        }
        Ok(())
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn snapshot(&self) -> Snapshot {
        let center = |(x, y): Cell| GridVector::cell_center(x, y);
        let heading = self.next_heading();
        let head = center(self.head()) + heading.unit() * self.progress;

        let mut body = Vec::with_capacity(self.snake.len() + 1);
        body.push(head);
        if self.snake.len() == 1 {
            body.push(head);
        } else {
            body.extend(self.snake.iter().take(self.snake.len() - 1).map(|&cell| center(cell)));

            // The tail slides toward the next segment unless the coming step eats.
            let (dx, dy) = heading.offset();
            let next_head = (self.head().0 + dx, self.head().1 + dy);
            let tail = center(self.snake[self.snake.len() - 1]);
            let before_tail = center(self.snake[self.snake.len() - 2]);
            let retract = if next_head == self.food { 0.0 } else { self.progress };
            body.push(tail + (before_tail - tail) * retract);
        }

        Snapshot {
            board_width: self.width as u32,
            board_height: self.height as u32,
            body,
            heading: self.heading,
            speed: self.speed,
            food: center(self.food),
            score: self.score,
            over: self.over,
        }
    }
}
