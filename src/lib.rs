//! Q-Snake - a grid Snake game with a tabular Q-learning agent
//!
//! This library provides:
//! - Core game logic (game module)
//! - The tabular RL agent: observation encoding, symmetry canonicalization,
//!   Q-table, epsilon-greedy policy, TD(0) updates (rl module)
//! - TUI rendering (render module)
//! - Keyboard input handling (input module)
//! - Episode and evaluation statistics (metrics module)
//! - Execution modes: human, train, evaluate, visualize (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
