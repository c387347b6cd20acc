//! Visualization mode for watching a trained agent
//!
//! This module implements a TUI-based playback mode that loads a trained
//! agent and displays it playing Snake. Users can control playback speed,
//! pause, single-step, and reset episodes.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - N: Advance one step while paused
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit
//!
//! # Example
//!
//! ```rust,ignore
//! use q_snake::modes::{VisualizeMode, VisualizeConfig};
//! use std::path::PathBuf;
//!
//! let config = VisualizeConfig::new(PathBuf::from("models/snake.json"));
//! let mut visualize_mode = VisualizeMode::new(config)?;
//! visualize_mode.run().await?;
//! ```

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stderr, Stderr},
    path::PathBuf,
    time::Duration,
};
use tokio::time::{interval, Interval};

use crate::game::GameConfig;
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::rl::{load_agent, AgentConfig, Observation, QAgent, RewardConfig, SnakeEnvironment};

/// Playback speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 2 Hz (500ms per step)
    Slow,
    /// Normal: 8 Hz (125ms per step) - same as human mode
    Normal,
    /// Fast: 20 Hz (50ms per step)
    Fast,
    /// Very Fast: 60 Hz (16ms per step)
    VeryFast,
}

impl VisualizationSpeed {
    /// Get the tick interval for this speed
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    /// Get a string representation of the speed
    fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// Configuration for visualization mode
#[derive(Debug, Clone)]
pub struct VisualizeConfig {
    /// Path to the saved agent
    pub model_path: PathBuf,

    /// RNG seed for the environment and agent (None = entropy)
    pub seed: Option<u64>,

    /// Break Q-value ties by lowest index instead of randomly
    pub deterministic: bool,

    /// Game configuration (grid size, apple counts)
    pub game_config: GameConfig,
}

impl VisualizeConfig {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            seed: None,
            deterministic: false,
            game_config: GameConfig::default(),
        }
    }
}

/// Visualization mode for watching a trained agent
pub struct VisualizeMode {
    /// Trained agent (greedy playback, no learning)
    agent: QAgent,

    /// Snake environment
    env: SnakeEnvironment,

    /// Renderer for TUI display
    renderer: Renderer,

    /// Game metrics (best length, elapsed time)
    metrics: GameMetrics,

    /// Break Q-value ties by lowest index
    deterministic: bool,

    /// Whether to quit the visualization
    should_quit: bool,

    /// Whether playback is paused
    paused: bool,

    /// Advance one step on the next tick while paused
    step_once: bool,

    /// Restart the episode before the next step
    reset_requested: bool,

    /// Current playback speed
    speed: VisualizationSpeed,

    /// Number of episodes completed
    episode_count: usize,
}

impl VisualizeMode {
    /// Create a new visualization mode
    ///
    /// Loads a trained agent from the save file. Exploration is disabled;
    /// the agent plays its greedy policy.
    pub fn new(config: VisualizeConfig) -> Result<Self> {
        if let Err(msg) = config.game_config.validate() {
            bail!("Invalid game config: {}", msg);
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

        // Print loaded agent info
        println!("{}", "=".repeat(60));
        println!("Loaded Agent Information");
        println!("{}", "=".repeat(60));
        println!("Agent path: {:?}", config.model_path);
        println!("Training steps: {}", agent.step_count());
        println!("States in table: {}", agent.table().len());
        println!("{}", "=".repeat(60));
        println!();
        println!("Starting visualization...");
        println!();

        let env = match config.seed {
            Some(seed) => SnakeEnvironment::with_seed(
                config.game_config.clone(),
                RewardConfig::default(),
                seed,
            ),
            None => SnakeEnvironment::new(config.game_config.clone(), RewardConfig::default()),
        };

        Ok(Self {
            agent,
            env,
            renderer: Renderer::new(),
            metrics: GameMetrics::new(),
            deterministic: config.deterministic,
            should_quit: false,
            paused: false,
            step_once: false,
            reset_requested: false,
            speed: VisualizationSpeed::Normal,
            episode_count: 0,
        })
    }

    /// Run the visualization loop
    ///
    /// Sets up the terminal, runs the main playback loop, and cleans up
    /// on exit.
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run visualization loop
        let result = self.run_visualization_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    /// Main visualization loop
    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks based on speed
        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        // Reset environment
        let mut obs = self.env.reset();
        let mut done = false;

        loop {
            tokio::select! {
                // Handle keyboard input
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if !self.paused || self.step_once {
                        self.step_once = false;

                        if done {
                            // Auto-restart
                            obs = self.env.reset();
                            done = false;
                            self.episode_count += 1;
                            self.metrics.on_game_start();
                        } else {
                            obs = self.step_agent(&obs);
                            done = !self.env.state().is_alive;
                            if done {
                                self.metrics.on_game_over(self.env.state().snake.len() as u32);
                            }
                        }
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.render_frame(frame);
                    }).context("Failed to draw frame")?;
                }

                // Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.reset_requested {
                self.reset_requested = false;
                obs = self.env.reset();
                done = false;
                self.episode_count += 1;
                self.metrics.on_game_start();
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Step the agent forward one greedy action
    fn step_agent(&mut self, obs: &Observation) -> Observation {
        let direction = self.agent.greedy_action(obs, self.deterministic);
        let (next_obs, _reward, _done) = self.env.step(direction);
        next_obs
    }

    /// Handle keyboard events
    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                KeyCode::Char('n') => {
                    if self.paused {
                        self.step_once = true;
                    }
                }
                KeyCode::Char('r') => {
                    // Applied by the playback loop so its local
                    // observation is refreshed too
                    self.reset_requested = true;
                }
                KeyCode::Char('1') => {
                    self.change_speed(VisualizationSpeed::Slow, tick_timer);
                }
                KeyCode::Char('2') => {
                    self.change_speed(VisualizationSpeed::Normal, tick_timer);
                }
                KeyCode::Char('3') => {
                    self.change_speed(VisualizationSpeed::Fast, tick_timer);
                }
                KeyCode::Char('4') => {
                    self.change_speed(VisualizationSpeed::VeryFast, tick_timer);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Change the playback speed
    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        tick_timer.reset_after(self.speed.tick_interval());
    }

    /// Render the current frame
    fn render_frame(&self, frame: &mut ratatui::Frame) {
        let status = format!(
            "Episode {} | Speed: {}{}",
            self.episode_count + 1,
            self.speed.as_str(),
            if self.paused { " | PAUSED" } else { "" }
        );

        self.renderer
            .render_playback(frame, self.env.state(), &self.metrics, &status);
    }

    /// Cleanup terminal state
    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::save_agent;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    #[test]
    fn test_visualization_speed() {
        assert_eq!(VisualizationSpeed::Slow.tick_interval(), Duration::from_millis(500));
        assert_eq!(VisualizationSpeed::Normal.tick_interval(), Duration::from_millis(125));
        assert_eq!(VisualizationSpeed::Fast.tick_interval(), Duration::from_millis(50));
        assert_eq!(VisualizationSpeed::VeryFast.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_visualize_mode_creation() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("agent.json");

        // Create and save a fresh agent
        let agent = QAgent::with_seed(AgentConfig::default(), 11);
        save_agent(&agent, &model_path).unwrap();

        // Load in visualize mode
        let config = VisualizeConfig::new(model_path);
        let visualize_mode = VisualizeMode::new(config);

        assert!(visualize_mode.is_ok());
        let mode = visualize_mode.unwrap();
        assert_eq!(mode.episode_count, 0);
        assert!(!mode.paused);
        assert_eq!(mode.speed, VisualizationSpeed::Normal);
    }

    #[test]
    fn test_visualize_missing_model_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = VisualizeConfig::new(temp_dir.path().join("missing.json"));
        assert!(VisualizeMode::new(config).is_err());
    }

    #[test]
    fn test_visualize_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("agent.json");
        save_agent(&QAgent::with_seed(AgentConfig::default(), 11), &model_path).unwrap();

        // A zero-width grid must fail validation, not panic in placement
        let mut config = VisualizeConfig::new(model_path);
        config.game_config = GameConfig::new(0, 10);
        assert!(VisualizeMode::new(config).is_err());
    }

    #[tokio::test]
    async fn test_reset_key_defers_to_playback_loop() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("agent.json");
        save_agent(&QAgent::with_seed(AgentConfig::default(), 11), &model_path).unwrap();

        let mut mode = VisualizeMode::new(VisualizeConfig::new(model_path)).unwrap();
        let mut tick_timer = interval(VisualizationSpeed::Normal.tick_interval());

        let r_key = Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE));
        mode.handle_event(r_key, &mut tick_timer).unwrap();

        // The handler only requests the reset; the loop performs it so
        // the observation it feeds the agent is refreshed too
        assert!(mode.reset_requested);
        assert_eq!(mode.episode_count, 0);
    }
}
