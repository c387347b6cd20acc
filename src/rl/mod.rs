//! Tabular reinforcement learning for Snake
//!
//! Provides:
//! - Directional ray observations with coarse distance bins
//! - Symmetry canonicalization of observations into packed integer keys
//! - A sparse Q-table with lazy default rows
//! - The epsilon-greedy Q-learning agent
//! - A reward-shaping environment wrapper around the game engine
//! - Agent persistence as a versioned JSON payload

pub mod agent;
pub mod config;
pub mod environment;
pub mod observation;
pub mod persistence;
pub mod qtable;
pub mod symmetry;

pub use agent::QAgent;
pub use config::{AgentConfig, RewardConfig};
pub use environment::SnakeEnvironment;
pub use observation::{bin_distance, observe, Observation, RayFeatures};
pub use persistence::{load_agent, save_agent, SavedAgent};
pub use qtable::QTable;
pub use symmetry::{action_to_env, apply, canonicalize, pack_key, Transform};
