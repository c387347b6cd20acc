//! Training statistics tracking
//!
//! Tracks episode-level metrics over rolling windows so the training
//! loop can log smoothed progress.

use std::collections::VecDeque;

/// Episode statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use q_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(5, 150, 3, 1);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Final snake lengths (rolling window)
    final_lengths: VecDeque<usize>,

    /// Episode lengths in steps (rolling window)
    episode_steps: VecDeque<usize>,

    /// Green apples eaten per episode (rolling window)
    greens: VecDeque<u32>,

    /// Red apples eaten per episode (rolling window)
    reds: VecDeque<u32>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of environment steps taken
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self {
            final_lengths: VecDeque::with_capacity(window_size),
            episode_steps: VecDeque::with_capacity(window_size),
            greens: VecDeque::with_capacity(window_size),
            reds: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, final_length: usize, steps: usize, greens: u32, reds: u32) {
        Self::push_deque(&mut self.final_lengths, final_length, self.window_size);
        Self::push_deque(&mut self.episode_steps, steps, self.window_size);
        Self::push_deque(&mut self.greens, greens, self.window_size);
        Self::push_deque(&mut self.reds, reds, self.window_size);
        self.total_episodes += 1;
        self.total_steps += steps;
    }

    /// Mean final snake length over the rolling window
    pub fn mean_final_length(&self) -> f64 {
        Self::mean_usize(&self.final_lengths)
    }

    /// Mean episode length in steps over the rolling window
    pub fn mean_episode_steps(&self) -> f64 {
        Self::mean_usize(&self.episode_steps)
    }

    /// Mean green apples per episode over the rolling window
    pub fn mean_greens(&self) -> f64 {
        Self::mean_u32(&self.greens)
    }

    /// Mean red apples per episode over the rolling window
    pub fn mean_reds(&self) -> f64 {
        Self::mean_u32(&self.reds)
    }

    /// Total number of episodes completed
    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    /// Total number of environment steps taken
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Window size for rolling averages
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Len: {:.2} | Steps/ep: {:.1} | Greens: {:.2} | Reds: {:.2}",
            self.total_episodes,
            self.mean_final_length(),
            self.mean_episode_steps(),
            self.mean_greens(),
            self.mean_reds(),
        )
    }

    fn mean_usize(deque: &VecDeque<usize>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<usize>() as f64 / deque.len() as f64
        }
    }

    fn mean_u32(deque: &VecDeque<u32>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<u32>() as f64 / deque.len() as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
