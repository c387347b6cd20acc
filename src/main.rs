use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use q_snake::game::GameConfig;
use q_snake::modes::{
    EvalConfig, EvalMode, HumanMode, TrainConfig, TrainMode, VisualizeConfig, VisualizeMode,
};

#[derive(Parser)]
#[command(name = "q_snake")]
#[command(version, about = "Snake with a tabular Q-learning agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Grid width
    #[arg(long, default_value = "10", global = true)]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "10", global = true)]
    height: usize,

    /// RNG seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Play snake with keyboard controls
    Human,

    /// Train a Q-learning agent
    Train {
        /// Total environment steps to train for
        #[arg(long, default_value = "1000000")]
        steps: u64,

        /// Path to save the trained agent
        #[arg(long, default_value = "models/snake.json")]
        save_path: PathBuf,

        /// Save a checkpoint every N steps
        #[arg(long, default_value = "100000")]
        checkpoint_frequency: u64,

        /// Log progress every N steps
        #[arg(long, default_value = "10000")]
        log_frequency: u64,

        /// Resume training from a previously saved agent
        #[arg(long)]
        resume: Option<PathBuf>,

        /// When resuming, also restore hyperparameters from the save file
        #[arg(long)]
        strict: bool,

        /// Learning rate
        #[arg(long)]
        alpha: Option<f64>,

        /// Discount factor
        #[arg(long)]
        gamma: Option<f64>,

        /// Disable mirror symmetry in state canonicalization
        #[arg(long)]
        no_mirror: bool,
    },

    /// Evaluate a trained agent over many episodes
    Evaluate {
        /// Path to the saved agent
        #[arg(long, default_value = "models/snake.json")]
        model_path: PathBuf,

        /// Number of episodes to run
        #[arg(long, default_value = "1000")]
        episodes: u32,

        /// Break Q-value ties by lowest index instead of randomly
        #[arg(long)]
        deterministic: bool,
    },

    /// Watch a trained agent play
    Visualize {
        /// Path to the saved agent
        #[arg(long, default_value = "models/snake.json")]
        model_path: PathBuf,

        /// Break Q-value ties by lowest index instead of randomly
        #[arg(long)]
        deterministic: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let game_config = GameConfig::new(cli.width, cli.height);

    match cli.command {
        Command::Human => {
            let mut human_mode = HumanMode::new(game_config)?;
            human_mode.run().await?;
        }
        Command::Train {
            steps,
            save_path,
            checkpoint_frequency,
            log_frequency,
            resume,
            strict,
            alpha,
            gamma,
            no_mirror,
        } => {
            let mut config = TrainConfig::new(steps, save_path);
            config.checkpoint_frequency = checkpoint_frequency;
            config.log_frequency = log_frequency;
            config.seed = cli.seed;
            config.resume = resume;
            config.strict = strict;
            config.game_config = game_config;
            if let Some(alpha) = alpha {
                config.agent_config.alpha = alpha;
            }
            if let Some(gamma) = gamma {
                config.agent_config.gamma = gamma;
            }
            if no_mirror {
                config.agent_config.use_mirror = false;
            }

            let mut train_mode = TrainMode::new(config)?;
            train_mode.run()?;
        }
        Command::Evaluate {
            model_path,
            episodes,
            deterministic,
        } => {
            let mut config = EvalConfig::new(model_path);
            config.episodes = episodes;
            config.seed = cli.seed;
            config.deterministic = deterministic;
            config.game_config = game_config;

            let mut eval_mode = EvalMode::new(config)?;
            eval_mode.run()?;
        }
        Command::Visualize {
            model_path,
            deterministic,
        } => {
            let mut config = VisualizeConfig::new(model_path);
            config.seed = cli.seed;
            config.deterministic = deterministic;
            config.game_config = game_config;

            let mut visualize_mode = VisualizeMode::new(config)?;
            visualize_mode.run().await?;
        }
    }

    Ok(())
}
