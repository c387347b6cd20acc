use std::collections::HashSet;

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    ///
    /// Body segments extend backwards from the head, opposite to the
    /// direction of travel.
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    ///
    /// Returns None when the snake has shrunk to nothing.
    pub fn head(&self) -> Option<Position> {
        self.body.first().copied()
    }

    /// Check if a position is occupied by any segment, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake has shrunk to nothing
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Tile event reported by a game step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEvent {
    /// Plain movement onto an empty cell
    Moved,
    /// Ate a green apple (grow +1)
    AteGreen,
    /// Ate a red apple (shrink -1)
    AteRed,
    /// Hit the boundary or a wall cell
    HitWall,
    /// Hit the snake's own body
    HitSelf,
    /// Shrunk to zero length after a red apple
    Starved,
}

impl TileEvent {
    /// Whether this event ends the episode
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TileEvent::HitWall | TileEvent::HitSelf | TileEvent::Starved
        )
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub walls: HashSet<Position>,
    pub green_apples: HashSet<Position>,
    pub red_apples: HashSet<Position>,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Green apples eaten this episode
    pub score: u32,
    /// Red apples eaten this episode
    pub reds_eaten: u32,
    pub steps: u32,
    pub is_alive: bool,
}

impl GameState {
    /// Create a new game state
    pub fn new(
        snake: Snake,
        walls: HashSet<Position>,
        green_apples: HashSet<Position>,
        red_apples: HashSet<Position>,
        grid_width: usize,
        grid_height: usize,
    ) -> Self {
        Self {
            snake,
            walls,
            green_apples,
            red_apples,
            grid_width,
            grid_height,
            score: 0,
            reds_eaten: 0,
            steps: 0,
            is_alive: true,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position terminates a ray: outside the grid or a wall cell
    pub fn is_blocked(&self, pos: Position) -> bool {
        !self.is_in_bounds(pos) || self.walls.contains(&pos)
    }

    /// Check if a position is free for spawning
    pub fn is_free(&self, pos: Position) -> bool {
        !self.walls.contains(&pos)
            && !self.snake.occupies(pos)
            && !self.green_apples.contains(&pos)
            && !self.red_apples.contains(&pos)
    }
}
