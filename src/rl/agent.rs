//! The tabular Q-learning agent
//!
//! One decision/update cycle: `decide` canonicalizes the observation,
//! picks an action in the canonical frame and records it as the pending
//! transition; the caller executes the move; `update` applies the TD(0)
//! rule to the pending pair and consumes it.
//!
//! The agent is single-trajectory by design: calling `decide` twice
//! without an `update` in between silently replaces the pending
//! transition. It is not reentrant and its table is not shared.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::Direction;

use super::config::AgentConfig;
use super::observation::Observation;
use super::persistence::{SavedAgent, SAVE_VERSION};
use super::qtable::QTable;
use super::symmetry::{action_to_env, apply, canonicalize};

/// Tabular Q-learning agent with symmetry-reduced state keys
pub struct QAgent {
    config: AgentConfig,
    table: QTable,
    step_count: u64,
    /// Most recent (canonical key, canonical action) awaiting a reward
    pending: Option<(u64, usize)>,
    rng: StdRng,
}

impl QAgent {
    /// Create a fresh agent
    pub fn new(config: AgentConfig) -> Self {
        let q_init = config.q_init;
        Self {
            config,
            table: QTable::new(q_init),
            step_count: 0,
            pending: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a seeded agent for reproducible runs
    pub fn with_seed(config: AgentConfig, seed: u64) -> Self {
        let q_init = config.q_init;
        Self {
            config,
            table: QTable::new(q_init),
            step_count: 0,
            pending: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Update steps performed so far; drives the exploration decay
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Current exploration rate
    ///
    /// Linear decay from `eps_start` to `eps_end` over `eps_decay_steps`
    /// update steps, clamped at the endpoint.
    pub fn epsilon(&self) -> f64 {
        let t = (self.step_count as f64 / self.config.eps_decay_steps as f64).min(1.0);
        self.config.eps_start + (self.config.eps_end - self.config.eps_start) * t
    }

    /// Choose an action for the current observation (training policy)
    ///
    /// Epsilon-greedy over the safe canonical actions, with value ties
    /// broken uniformly at random. Records the pending transition for the
    /// following `update` and returns the env-frame direction.
    pub fn decide(&mut self, obs: &Observation) -> Direction {
        let (key, transform) = canonicalize(obs, self.config.use_mirror);
        let canonical = apply(obs, transform);
        let safe = safe_actions(&canonical);

        let row = *self.table.row(key);

        let action = if self.rng.gen::<f64>() < self.epsilon() {
            safe[self.rng.gen_range(0..safe.len())]
        } else {
            self.pick_best(&row, &safe, false)
        };

        self.pending = Some((key, action));
        Direction::ALL[action_to_env(action, transform)]
    }

    /// Apply the TD(0) update for the pending transition
    ///
    /// No-op when no decision has been made yet. The next observation is
    /// canonicalized independently with its own minimal transform.
    pub fn update(&mut self, reward: f64, next_obs: &Observation, terminal: bool) {
        let Some((key, action)) = self.pending.take() else {
            return;
        };

        let (next_key, _) = canonicalize(next_obs, self.config.use_mirror);
        // Materialize the next row so the table reflects every state seen
        self.table.row(next_key);

        let target = if terminal {
            reward
        } else {
            reward + self.config.gamma * self.table.best_value(next_key)
        };

        let row = self.table.row(key);
        row[action] += self.config.alpha * (target - row[action]);

        self.step_count += 1;
    }

    /// Choose an action without exploring or learning (evaluation policy)
    ///
    /// Same masking and value lookup as `decide`, but never materializes
    /// a table row and never touches the pending transition. With
    /// `deterministic` set, value ties keep the first safe action instead
    /// of sampling.
    pub fn greedy_action(&mut self, obs: &Observation, deterministic: bool) -> Direction {
        let (key, transform) = canonicalize(obs, self.config.use_mirror);
        let canonical = apply(obs, transform);
        let safe = safe_actions(&canonical);

        let row = self
            .table
            .get(key)
            .copied()
            .unwrap_or([self.config.q_init; 4]);

        let action = self.pick_best(&row, &safe, deterministic);
        Direction::ALL[action_to_env(action, transform)]
    }

    /// Best safe action by value, ties broken uniformly unless deterministic
    fn pick_best(&mut self, row: &[f64; 4], safe: &[usize], deterministic: bool) -> usize {
        let best_value = safe
            .iter()
            .map(|&a| row[a])
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<usize> = safe.iter().copied().filter(|&a| row[a] == best_value).collect();

        if deterministic {
            ties[0]
        } else {
            ties[self.rng.gen_range(0..ties.len())]
        }
    }

    /// Snapshot the agent for persistence
    pub fn snapshot(&self) -> SavedAgent {
        SavedAgent {
            version: SAVE_VERSION,
            alpha: self.config.alpha,
            gamma: self.config.gamma,
            eps_start: self.config.eps_start,
            eps_end: self.config.eps_end,
            eps_decay_steps: self.config.eps_decay_steps,
            q_init: self.config.q_init,
            use_mirror: self.config.use_mirror,
            step_count: self.step_count,
            entries: self.table.to_entries(),
        }
    }

    /// Restore the agent from a saved payload
    ///
    /// The table, step count and symmetry flag are always restored (the
    /// keys are only meaningful under the symmetry that produced them).
    /// The remaining hyperparameters are overwritten only when `strict`
    /// is requested; otherwise the constructor-supplied values stay,
    /// which supports loading weights while overriding the exploration
    /// schedule for evaluation.
    pub fn restore(&mut self, saved: SavedAgent, strict: bool) {
        if strict {
            self.config.alpha = saved.alpha;
            self.config.gamma = saved.gamma;
            self.config.eps_start = saved.eps_start;
            self.config.eps_end = saved.eps_end;
            self.config.eps_decay_steps = saved.eps_decay_steps;
            self.config.q_init = saved.q_init;
        }

        self.config.use_mirror = saved.use_mirror;
        self.table = QTable::from_entries(saved.entries, self.config.q_init);
        self.step_count = saved.step_count;
        self.pending = None;
    }
}

/// Canonical actions that are not an immediately adjacent hazard
///
/// A direction is unsafe when its wall or body bin is 1. When everything
/// is unsafe the agent is forced to pick among all four.
fn safe_actions(canonical: &Observation) -> Vec<usize> {
    let safe: Vec<usize> = (0..4)
        .filter(|&a| canonical.rays[a].wall != 1 && canonical.rays[a].body != 1)
        .collect();

    if safe.is_empty() {
        (0..4).collect()
    } else {
        safe
    }
}
