use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{
    action::{Action, Direction},
    config::GameConfig,
    state::{GameState, Position, Snake, TileEvent},
};

/// How many random head placements to try before shortening the snake
const PLACEMENT_ATTEMPTS: usize = 64;

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Tile event produced by the move
    pub event: TileEvent,
    /// Whether the game has terminated
    pub terminated: bool,
}

/// The game engine that handles all game logic
///
/// Moves are executed literally: a 180-degree turn into the snake's own
/// neck is a self-collision, not a filtered input. Front-ends that want
/// reversal protection apply it at the input layer.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a seeded engine for reproducible runs
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to a fresh random state
    ///
    /// Places the snake as a straight line at a random position and
    /// orientation, then spawns the configured number of apples on
    /// uniformly random free cells.
    pub fn reset(&mut self) -> GameState {
        let walls = HashSet::new();
        let snake = self.place_snake(&walls);

        let mut state = GameState::new(
            snake,
            walls,
            HashSet::new(),
            HashSet::new(),
            self.config.grid_width,
            self.config.grid_height,
        );

        for _ in 0..self.config.green_apples {
            self.spawn_green(&mut state);
        }
        for _ in 0..self.config.red_apples {
            self.spawn_red(&mut state);
        }

        state
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_alive {
            return StepResult {
                event: TileEvent::Moved,
                terminated: true,
            };
        }

        if let Action::Move(direction) = action {
            state.snake.direction = direction;
        }

        let Some(head) = state.snake.head() else {
            return StepResult {
                event: TileEvent::Starved,
                terminated: true,
            };
        };
        let new_head = head.moved_in_direction(state.snake.direction);

        // Boundary or wall cell
        if state.is_blocked(new_head) {
            state.is_alive = false;
            state.steps += 1;
            return StepResult {
                event: TileEvent::HitWall,
                terminated: true,
            };
        }

        let ate_green = state.green_apples.contains(&new_head);
        let ate_red = state.red_apples.contains(&new_head);

        // Tail segments that vacate this tick: none when growing, one for a
        // normal move, two when a red apple shrinks the snake. Moving onto a
        // vacating cell is legal.
        let mut vacating = if ate_green { 0 } else { 1 };
        if ate_red && !ate_green {
            vacating += 1;
        }
        let keep = state.snake.len() - vacating.min(state.snake.len());
        if state.snake.body[..keep].contains(&new_head) {
            state.is_alive = false;
            state.steps += 1;
            return StepResult {
                event: TileEvent::HitSelf,
                terminated: true,
            };
        }

        state.snake.body.insert(0, new_head);

        let mut event = TileEvent::Moved;

        if ate_green {
            state.green_apples.remove(&new_head);
            state.score += 1;
            self.spawn_green(state);
            event = TileEvent::AteGreen;
        } else {
            state.snake.body.pop();
        }

        if ate_red {
            state.red_apples.remove(&new_head);
            state.reds_eaten += 1;
            self.spawn_red(state);
            event = TileEvent::AteRed;

            // Shrink: one extra tail segment goes
            state.snake.body.pop();
            if state.snake.is_empty() {
                state.is_alive = false;
                state.steps += 1;
                return StepResult {
                    event: TileEvent::Starved,
                    terminated: true,
                };
            }
        }

        state.steps += 1;

        StepResult {
            event,
            terminated: false,
        }
    }

    /// Place the snake as a random straight line avoiding walls
    ///
    /// Falls back to shorter placements only if the board is too cramped
    /// for the configured length.
    fn place_snake(&mut self, walls: &HashSet<Position>) -> Snake {
        let width = self.config.grid_width as i32;
        let height = self.config.grid_height as i32;
        let in_bounds =
            |pos: Position| pos.x >= 0 && pos.x < width && pos.y >= 0 && pos.y < height;

        let mut length = self.config.initial_snake_length;
        loop {
            for _ in 0..PLACEMENT_ATTEMPTS {
                let head = Position::new(
                    self.rng.gen_range(0..width),
                    self.rng.gen_range(0..height),
                );
                if walls.contains(&head) {
                    continue;
                }

                let mut directions = Direction::ALL;
                directions.shuffle(&mut self.rng);

                'directions: for &direction in &directions {
                    let snake = Snake::new(head, direction, length);
                    for &segment in &snake.body {
                        if !in_bounds(segment) || walls.contains(&segment) {
                            continue 'directions;
                        }
                    }
                    return snake;
                }
            }

            if length > 1 {
                length -= 1;
            }
        }
    }

    fn spawn_green(&mut self, state: &mut GameState) {
        if let Some(pos) = self.random_free_cell(state) {
            state.green_apples.insert(pos);
        }
    }

    fn spawn_red(&mut self, state: &mut GameState) {
        if let Some(pos) = self.random_free_cell(state) {
            state.red_apples.insert(pos);
        }
    }

    /// Pick a uniformly random free cell, or None when the board is full
    ///
    /// Candidates are collected in scan order so seeded runs stay
    /// reproducible.
    fn random_free_cell(&mut self, state: &GameState) -> Option<Position> {
        let mut free = Vec::new();
        for y in 0..state.grid_height as i32 {
            for x in 0..state.grid_width as i32 {
                let pos = Position::new(x, y);
                if state.is_free(pos) {
                    free.push(pos);
                }
            }
        }
        free.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GameEngine {
        GameEngine::with_seed(GameConfig::default(), 42)
    }

    fn bare_state(snake: Snake) -> GameState {
        GameState::new(
            snake,
            HashSet::new(),
            HashSet::new(),
            HashSet::new(),
            10,
            10,
        )
    }

    #[test]
    fn test_reset_invariants() {
        let mut engine = engine();

        for _ in 0..50 {
            let state = engine.reset();

            assert!(state.is_alive);
            assert_eq!(state.score, 0);
            assert_eq!(state.steps, 0);
            assert_eq!(state.snake.len(), 3);
            assert_eq!(state.green_apples.len(), 2);
            assert_eq!(state.red_apples.len(), 1);

            // Every segment in bounds, apples not on the snake
            for &segment in &state.snake.body {
                assert!(state.is_in_bounds(segment));
            }
            for &apple in state.green_apples.iter().chain(state.red_apples.iter()) {
                assert!(state.is_in_bounds(apple));
                assert!(!state.snake.occupies(apple));
            }

            // Straight line: consecutive segments differ by one step
            for pair in state.snake.body.windows(2) {
                assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
            }
        }
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 3));

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.event, TileEvent::Moved);
        assert!(!result.terminated);
        assert_eq!(state.steps, 1);
        assert_eq!(state.snake.head(), Some(Position::new(6, 5)));
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn test_green_apple_grows_and_respawns() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 3));
        state.green_apples.insert(Position::new(6, 5));

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.event, TileEvent::AteGreen);
        assert!(!result.terminated);
        assert_eq!(state.score, 1);
        assert_eq!(state.snake.len(), 4);
        // Eaten apple replaced by a fresh one on a free cell; the eaten
        // cell now holds the head, so the respawn cannot land there
        assert_eq!(state.green_apples.len(), 1);
        let apple = *state.green_apples.iter().next().expect("respawned apple");
        assert!(state.is_in_bounds(apple));
        assert!(!state.snake.occupies(apple));
        assert!(!state.green_apples.contains(&Position::new(6, 5)));
    }

    #[test]
    fn test_red_apple_shrinks() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 3));
        state.red_apples.insert(Position::new(6, 5));

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.event, TileEvent::AteRed);
        assert!(!result.terminated);
        assert_eq!(state.reds_eaten, 1);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.red_apples.len(), 1);
    }

    #[test]
    fn test_red_apple_starves_length_one_snake() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 1));
        state.red_apples.insert(Position::new(6, 5));

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.event, TileEvent::Starved);
        assert!(result.terminated);
        assert!(!state.is_alive);
        assert!(state.snake.is_empty());
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(0, 5), Direction::Left, 3));

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.event, TileEvent::HitWall);
        assert!(result.terminated);
        assert!(!state.is_alive);
    }

    #[test]
    fn test_wall_cell_collision() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 3));
        state.walls.insert(Position::new(6, 5));

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.event, TileEvent::HitWall);
        assert!(result.terminated);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();
        // Body: (5,5), (4,5), (3,5), (2,5), (1,5)
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 5));

        // Down, Left, Up runs into (4,5) which does not vacate in time
        engine.step(&mut state, Action::Move(Direction::Down));
        engine.step(&mut state, Action::Move(Direction::Left));
        let result = engine.step(&mut state, Action::Move(Direction::Up));

        assert_eq!(result.event, TileEvent::HitSelf);
        assert!(result.terminated);
    }

    #[test]
    fn test_literal_reversal_is_self_collision() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 3));

        // The engine does not filter 180-degree turns
        let result = engine.step(&mut state, Action::Move(Direction::Left));

        assert_eq!(result.event, TileEvent::HitSelf);
        assert!(result.terminated);
    }

    #[test]
    fn test_tail_chase_is_legal() {
        let mut engine = engine();
        // Square loop: head (5,5), tail (5,6) vacates as the head arrives
        let snake = Snake {
            body: vec![
                Position::new(5, 5),
                Position::new(4, 5),
                Position::new(4, 6),
                Position::new(5, 6),
            ],
            direction: Direction::Up,
        };
        let mut state = bare_state(snake);

        let result = engine.step(&mut state, Action::Move(Direction::Down));

        assert_eq!(result.event, TileEvent::Moved);
        assert!(!result.terminated);
        assert_eq!(state.snake.head(), Some(Position::new(5, 6)));
        assert_eq!(state.snake.len(), 4);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine();
        let mut state = bare_state(Snake::new(Position::new(5, 5), Direction::Right, 3));
        state.is_alive = false;
        let steps_before = state.steps;

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert_eq!(state.steps, steps_before);
    }

    #[test]
    fn test_seeded_reset_is_reproducible() {
        let mut a = GameEngine::with_seed(GameConfig::default(), 7);
        let mut b = GameEngine::with_seed(GameConfig::default(), 7);

        assert_eq!(a.reset(), b.reset());
        assert_eq!(a.reset(), b.reset());
    }
}
