//! Evaluation mode for a trained agent
//!
//! Loads a saved agent, runs it greedily (no exploration, no learning) for a
//! fixed number of episodes, and reports aggregate statistics.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::game::GameConfig;
use crate::metrics::EvalStats;
use crate::rl::{load_agent, AgentConfig, QAgent, RewardConfig, SnakeEnvironment};

/// Configuration for evaluation mode
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Path to the saved agent
    pub model_path: PathBuf,

    /// Number of episodes to run
    pub episodes: u32,

    /// Abort an episode after this many steps (guards against loops)
    pub max_steps_per_episode: u32,

    /// RNG seed for the environment and agent (None = entropy)
    pub seed: Option<u64>,

    /// Break Q-value ties by lowest index instead of randomly
    pub deterministic: bool,

    /// Game configuration (grid size, apple counts)
    pub game_config: GameConfig,

    /// Reward parameters (unused by the greedy policy, kept for the env)
    pub reward_config: RewardConfig,
}

impl EvalConfig {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            episodes: 1000,
            max_steps_per_episode: 10_000,
            seed: None,
            deterministic: false,
            game_config: GameConfig::default(),
            reward_config: RewardConfig::default(),
        }
    }
}

/// Evaluation mode
pub struct EvalMode {
    agent: QAgent,
    env: SnakeEnvironment,
    config: EvalConfig,
}

impl EvalMode {
    /// Create a new evaluation mode, loading the agent from disk
    ///
    /// The agent runs with exploration disabled; hyperparameters in the save
    /// file are not restored since the greedy policy only needs the Q-table.
    pub fn new(config: EvalConfig) -> Result<Self> {
        if let Err(msg) = config.game_config.validate() {
            bail!("Invalid game config: {}", msg);
        }
        if config.episodes == 0 {
            bail!("Invalid eval config: episodes must be positive");
        }

        let agent_config = AgentConfig {
            eps_start: 0.0,
            eps_end: 0.0,
            ..AgentConfig::default()
        };

        let mut agent = match config.seed {
            Some(seed) => QAgent::with_seed(agent_config, seed),
            None => QAgent::new(agent_config),
        };

        load_agent(&mut agent, &config.model_path, false)
            .with_context(|| format!("Failed to load agent from {:?}", config.model_path))?;

        let env = match config.seed {
            Some(seed) => SnakeEnvironment::with_seed(
                config.game_config.clone(),
                config.reward_config.clone(),
                seed,
            ),
            None => SnakeEnvironment::new(config.game_config.clone(), config.reward_config.clone()),
        };

        Ok(Self { agent, env, config })
    }

    /// Run all evaluation episodes and return the collected statistics
    pub fn run(&mut self) -> Result<EvalStats> {
        println!("{}", "=".repeat(70));
        println!("Evaluation - Snake");
        println!("{}", "=".repeat(70));
        println!("Model: {:?}", self.config.model_path);
        println!("States in table: {}", self.agent.table().len());
        println!("Episodes: {}", self.config.episodes);
        println!();

        let mut stats = EvalStats::new();
        let progress_every = (self.config.episodes / 10).max(1);

        for episode in 0..self.config.episodes {
            let died = self.run_episode()?;

            let state = self.env.state();
            stats.record_episode(
                state.snake.len(),
                state.score,
                state.reds_eaten,
                died,
            );

            if (episode + 1) % progress_every == 0 {
                println!(
                    "[{}/{}] {}",
                    episode + 1,
                    self.config.episodes,
                    stats.format_summary()
                );
            }
        }

        println!("\nEvaluation complete!");
        println!("{}", stats.format_summary());

        Ok(stats)
    }

    /// Run one greedy episode; returns whether the snake died
    fn run_episode(&mut self) -> Result<bool> {
        let mut obs = self.env.reset();

        for _ in 0..self.config.max_steps_per_episode {
            let direction = self.agent.greedy_action(&obs, self.config.deterministic);
            let (next_obs, _reward, terminated) = self.env.step(direction);

            if terminated {
                return Ok(true);
            }
            obs = next_obs;
        }

        // Step cap hit without dying
        Ok(false)
    }
}
