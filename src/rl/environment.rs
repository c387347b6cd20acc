//! Snake environment for reinforcement learning
//!
//! Wraps the game engine behind the interface the agent trains against:
//! directional observations in, real-frame directions out, with tile
//! events mapped to scalar rewards plus distance shaping toward the
//! closest green apple.

use crate::game::{Action, Direction, GameConfig, GameEngine, GameState, TileEvent};

use super::config::RewardConfig;
use super::observation::{observe, Observation};

/// RL-facing wrapper around engine and state
pub struct SnakeEnvironment {
    engine: GameEngine,
    state: GameState,
    rewards: RewardConfig,
}

impl SnakeEnvironment {
    /// Create a new environment
    pub fn new(config: GameConfig, rewards: RewardConfig) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();
        Self {
            engine,
            state,
            rewards,
        }
    }

    /// Create a seeded environment for reproducible runs
    pub fn with_seed(config: GameConfig, rewards: RewardConfig, seed: u64) -> Self {
        let mut engine = GameEngine::with_seed(config, seed);
        let state = engine.reset();
        Self {
            engine,
            state,
            rewards,
        }
    }

    /// Reset the environment and return the initial observation
    pub fn reset(&mut self) -> Observation {
        self.state = self.engine.reset();
        observe(&self.state)
    }

    /// Current observation without stepping
    pub fn observe(&self) -> Observation {
        observe(&self.state)
    }

    /// Step the environment with a real-frame direction
    ///
    /// Returns (next observation, reward, done). Shaping rewards the move
    /// for closing in on the nearest green apple and penalizes backing
    /// away; it is suppressed on terminal steps and on green consumption.
    pub fn step(&mut self, direction: Direction) -> (Observation, f64, bool) {
        let before = closest_green_distance(&self.state);

        let result = self.engine.step(&mut self.state, Action::Move(direction));

        let mut reward = match result.event {
            TileEvent::HitWall | TileEvent::HitSelf | TileEvent::Starved => self.rewards.death,
            TileEvent::AteGreen => self.rewards.green,
            TileEvent::AteRed => self.rewards.red,
            TileEvent::Moved => self.rewards.step,
        };

        if !result.terminated && result.event != TileEvent::AteGreen {
            let after = closest_green_distance(&self.state);
            if let (Some(before), Some(after)) = (before, after) {
                if after < before {
                    reward += self.rewards.shaping;
                } else if after > before {
                    reward -= self.rewards.shaping;
                }
            }
        }

        (observe(&self.state), reward, result.terminated)
    }

    /// Reference to the current game state (for rendering and metrics)
    pub fn state(&self) -> &GameState {
        &self.state
    }
}

/// Manhattan distance from the head to the nearest green apple
fn closest_green_distance(state: &GameState) -> Option<u32> {
    let head = state.snake.head()?;
    state
        .green_apples
        .iter()
        .map(|&apple| head.manhattan_distance(apple))
        .min()
}
