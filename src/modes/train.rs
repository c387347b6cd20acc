//! Training mode for the tabular Q-learning agent
//!
//! This module implements the training loop. It runs episodes in the Snake
//! environment, updates the agent's Q-table after every step, and
//! periodically logs progress and saves checkpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use q_snake::modes::{TrainMode, TrainConfig};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(1_000_000, PathBuf::from("models/snake.json"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! ```

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::game::GameConfig;
use crate::metrics::TrainingStats;
use crate::rl::{
    load_agent, save_agent, AgentConfig, QAgent, RewardConfig, SnakeEnvironment,
};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Total environment steps to train for
    pub total_steps: u64,

    /// Path to save the final trained agent
    pub save_path: PathBuf,

    /// Save a checkpoint every N steps
    pub checkpoint_frequency: u64,

    /// Log training progress every N steps
    pub log_frequency: u64,

    /// RNG seed for the environment and agent (None = entropy)
    pub seed: Option<u64>,

    /// Resume training from a previously saved agent
    pub resume: Option<PathBuf>,

    /// When resuming, also restore hyperparameters from the save file
    pub strict: bool,

    /// Game configuration (grid size, apple counts)
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub agent_config: AgentConfig,

    /// Reward shaping parameters
    pub reward_config: RewardConfig,
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    ///
    /// # Arguments
    ///
    /// * `total_steps` - Total environment steps to train for
    /// * `save_path` - Path to save the final agent
    pub fn new(total_steps: u64, save_path: PathBuf) -> Self {
        Self {
            total_steps,
            save_path,
            checkpoint_frequency: 100_000,
            log_frequency: 10_000,
            seed: None,
            resume: None,
            strict: false,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
            reward_config: RewardConfig::default(),
        }
    }
}

/// Training mode for the Q-learning agent
///
/// Runs the step loop, performing a TD(0) update after every environment
/// transition. Periodically logs progress and saves checkpoints.
pub struct TrainMode {
    /// Agent being trained
    agent: QAgent,

    /// Snake environment for experience collection
    env: SnakeEnvironment,

    /// Rolling episode statistics
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,
}

impl TrainMode {
    /// Create a new training mode
    ///
    /// Validates the configurations and, if `resume` is set, loads the
    /// saved agent before training starts.
    pub fn new(config: TrainConfig) -> Result<Self> {
        if let Err(msg) = config.game_config.validate() {
            bail!("Invalid game config: {}", msg);
        }
        if let Err(msg) = config.agent_config.validate() {
            bail!("Invalid agent config: {}", msg);
        }
        if let Err(msg) = config.reward_config.validate() {
            bail!("Invalid reward config: {}", msg);
        }

        let mut agent = match config.seed {
            Some(seed) => QAgent::with_seed(config.agent_config.clone(), seed),
            None => QAgent::new(config.agent_config.clone()),
        };

        if let Some(resume_path) = &config.resume {
            load_agent(&mut agent, resume_path, config.strict)
                .with_context(|| format!("Failed to resume from {:?}", resume_path))?;
            println!(
                "Resumed from {:?} ({} states, {} steps)",
                resume_path,
                agent.table().len(),
                agent.step_count()
            );
        }

        let env = match config.seed {
            Some(seed) => SnakeEnvironment::with_seed(
                config.game_config.clone(),
                config.reward_config.clone(),
                seed,
            ),
            None => SnakeEnvironment::new(config.game_config.clone(), config.reward_config.clone()),
        };

        // 100-episode rolling window
        let stats = TrainingStats::new(100);

        Ok(Self {
            agent,
            env,
            stats,
            config,
        })
    }

    /// Run the training loop
    ///
    /// Trains the agent for the configured number of steps, logging progress
    /// and saving checkpoints periodically, then writes the final save file.
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        let mut obs = self.env.reset();
        let mut episode_steps: usize = 0;
        let start_step = self.agent.step_count();
        let end_step = start_step + self.config.total_steps;

        while self.agent.step_count() < end_step {
            let direction = self.agent.decide(&obs);
            let (next_obs, reward, terminated) = self.env.step(direction);
            self.agent.update(reward, &next_obs, terminated);

            episode_steps += 1;

            if terminated {
                let state = self.env.state();
                self.stats.record_episode(
                    state.snake.len(),
                    episode_steps,
                    state.score,
                    state.reds_eaten,
                );
                episode_steps = 0;
                obs = self.env.reset();
            } else {
                obs = next_obs;
            }

            let step = self.agent.step_count();

            if step % self.config.log_frequency == 0 {
                self.print_progress(step, end_step);
            }

            if step % self.config.checkpoint_frequency == 0 && step < end_step {
                self.save_checkpoint(step)?;
            }
        }

        // Final save
        save_agent(&self.agent, &self.config.save_path).with_context(|| {
            format!("Failed to save final agent to {:?}", self.config.save_path)
        })?;

        println!("\nTraining complete!");
        println!("Final agent saved to: {:?}", self.config.save_path);
        println!("States visited: {}", self.agent.table().len());
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Save a checkpoint of the current agent
    fn save_checkpoint(&self, step: u64) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_step{}.json", step));

        save_agent(&self.agent, &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        println!("  Checkpoint saved: {:?}", checkpoint_path);

        Ok(())
    }

    /// Print training header information
    fn print_header(&self) {
        println!("{}", "=".repeat(70));
        println!("Q-Learning Training - Snake");
        println!("{}", "=".repeat(70));
        println!("Total steps: {}", self.config.total_steps);
        println!(
            "Game Config: {}x{} grid, {} green / {} red apples",
            self.config.game_config.grid_width,
            self.config.game_config.grid_height,
            self.config.game_config.green_apples,
            self.config.game_config.red_apples
        );
        println!("Agent Config:");
        println!("  Alpha: {}", self.config.agent_config.alpha);
        println!("  Gamma: {}", self.config.agent_config.gamma);
        println!(
            "  Epsilon: {} -> {} over {} steps",
            self.config.agent_config.eps_start,
            self.config.agent_config.eps_end,
            self.config.agent_config.eps_decay_steps
        );
        println!("  Q init: {}", self.config.agent_config.q_init);
        println!("  Mirror symmetry: {}", self.config.agent_config.use_mirror);
        println!("Checkpoints: Every {} steps", self.config.checkpoint_frequency);
        println!("Logging: Every {} steps", self.config.log_frequency);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    /// Print training progress
    fn print_progress(&self, step: u64, end_step: u64) {
        println!(
            "[Step {}/{}] eps: {:.3} | States: {} | {}",
            step,
            end_step,
            self.agent.epsilon(),
            self.agent.table().len(),
            self.stats.format_summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(1000, PathBuf::from("test.json"));
        assert_eq!(config.total_steps, 1000);
        assert_eq!(config.save_path, PathBuf::from("test.json"));
    }

    #[test]
    fn test_train_mode_rejects_bad_config() {
        let mut config = TrainConfig::new(1000, PathBuf::from("test.json"));
        config.agent_config.gamma = 1.5;
        assert!(TrainMode::new(config).is_err());
    }

    #[test]
    fn test_short_training_run_saves_agent() {
        let temp_dir = TempDir::new().unwrap();
        let save_path = temp_dir.path().join("agent.json");

        let mut config = TrainConfig::new(500, save_path.clone());
        config.seed = Some(7);
        config.log_frequency = 1_000_000;
        config.checkpoint_frequency = 250;

        let mut train_mode = TrainMode::new(config).unwrap();
        train_mode.run().unwrap();

        assert!(save_path.exists());
        assert!(temp_dir.path().join("checkpoint_step250.json").exists());
        assert_eq!(train_mode.agent.step_count(), 500);
        assert!(!train_mode.agent.table().is_empty());
    }

    #[test]
    fn test_resume_continues_step_count() {
        let temp_dir = TempDir::new().unwrap();
        let save_path = temp_dir.path().join("agent.json");

        let mut config = TrainConfig::new(200, save_path.clone());
        config.seed = Some(7);
        config.log_frequency = 1_000_000;
        config.checkpoint_frequency = 1_000_000;
        TrainMode::new(config.clone()).unwrap().run().unwrap();

        config.resume = Some(save_path);
        let mut resumed = TrainMode::new(config).unwrap();
        assert_eq!(resumed.agent.step_count(), 200);
        resumed.run().unwrap();
        assert_eq!(resumed.agent.step_count(), 400);
    }
}
