//! Hyperparameter configuration for the tabular agent and reward model

use serde::{Deserialize, Serialize};

/// Configuration for the tabular Q-learning agent
///
/// # Example
///
/// ```rust
/// use q_snake::rl::AgentConfig;
///
/// // Use default hyperparameters
/// let config = AgentConfig::default();
///
/// // Or customize specific parameters
/// let config = AgentConfig {
///     alpha: 0.1,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Learning rate for the TD(0) update
    ///
    /// Default: 0.2
    pub alpha: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.9
    pub gamma: f64,

    /// Exploration rate at step 0
    ///
    /// Default: 0.2
    pub eps_start: f64,

    /// Exploration rate after the decay window
    ///
    /// Default: 0.0
    pub eps_end: f64,

    /// Number of update steps over which epsilon decays linearly
    ///
    /// Default: 200_000
    pub eps_decay_steps: u64,

    /// Default action-value for unseen states
    ///
    /// A positive value makes unexplored actions look attractive
    /// (optimistic initialization). Training and evaluation must agree on
    /// this default or the learning signal is corrupted.
    ///
    /// Default: 1.0
    pub q_init: f64,

    /// Whether canonicalization also considers the 4 mirrored rotations
    ///
    /// Default: true
    pub use_mirror: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            gamma: 0.9,
            eps_start: 0.2,
            eps_end: 0.0,
            eps_decay_steps: 200_000,
            q_init: 1.0,
            use_mirror: true,
        }
    }
}

impl AgentConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(format!("alpha must be in (0, 1], got {}", self.alpha));
        }

        if !(0.0..1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1), got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.eps_start) {
            return Err(format!(
                "eps_start must be in [0, 1], got {}",
                self.eps_start
            ));
        }

        if !(0.0..=1.0).contains(&self.eps_end) {
            return Err(format!("eps_end must be in [0, 1], got {}", self.eps_end));
        }

        if self.eps_decay_steps == 0 {
            return Err("eps_decay_steps must be at least 1".to_string());
        }

        Ok(())
    }
}

/// Reward model applied on top of tile events
///
/// All reward constants live here rather than in the training loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Reward for dying (wall, self, or starvation)
    ///
    /// Default: -100.0
    pub death: f64,

    /// Reward for eating a green apple
    ///
    /// Default: 10.0
    pub green: f64,

    /// Reward for eating a red apple
    ///
    /// Default: -10.0
    pub red: f64,

    /// Reward for a plain step
    ///
    /// Default: -0.01
    pub step: f64,

    /// Shaping bonus/penalty when the Manhattan distance to the closest
    /// green apple decreases/increases
    ///
    /// Suppressed on terminal steps and on green consumption. Default: 0.2
    pub shaping: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            death: -100.0,
            green: 10.0,
            red: -10.0,
            step: -0.01,
            shaping: 0.2,
        }
    }
}

impl RewardConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.shaping < 0.0 {
            return Err(format!(
                "shaping must be non-negative, got {}",
                self.shaping
            ));
        }

        Ok(())
    }
}
