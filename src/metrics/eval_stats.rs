//! Evaluation statistics over a batch of episodes

/// Per-episode results of a batch evaluation run
#[derive(Debug, Clone, Default)]
pub struct EvalStats {
    final_lengths: Vec<usize>,
    greens: Vec<u32>,
    reds: Vec<u32>,
    deaths: usize,
}

impl EvalStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished episode
    pub fn record_episode(&mut self, final_length: usize, greens: u32, reds: u32, died: bool) {
        self.final_lengths.push(final_length);
        self.greens.push(greens);
        self.reds.push(reds);
        if died {
            self.deaths += 1;
        }
    }

    /// Number of episodes recorded
    pub fn episodes(&self) -> usize {
        self.final_lengths.len()
    }

    /// Episodes that ended in a death rather than the step limit
    pub fn deaths(&self) -> usize {
        self.deaths
    }

    pub fn mean_final_length(&self) -> f64 {
        mean(self.final_lengths.iter().map(|&v| v as f64))
    }

    /// Population standard deviation of the final lengths
    pub fn std_final_length(&self) -> f64 {
        if self.final_lengths.is_empty() {
            return 0.0;
        }
        let mean_len = self.mean_final_length();
        let variance = self
            .final_lengths
            .iter()
            .map(|&v| {
                let d = v as f64 - mean_len;
                d * d
            })
            .sum::<f64>()
            / self.final_lengths.len() as f64;
        variance.sqrt()
    }

    pub fn min_final_length(&self) -> usize {
        self.final_lengths.iter().copied().min().unwrap_or(0)
    }

    pub fn max_final_length(&self) -> usize {
        self.final_lengths.iter().copied().max().unwrap_or(0)
    }

    pub fn mean_greens(&self) -> f64 {
        mean(self.greens.iter().map(|&v| v as f64))
    }

    pub fn mean_reds(&self) -> f64 {
        mean(self.reds.iter().map(|&v| v as f64))
    }

    /// Format a summary of the evaluation run
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Len: {:.3} (std {:.3}, min {}, max {}) | Greens: {:.2} | Reds: {:.2} | Deaths: {}",
            self.episodes(),
            self.mean_final_length(),
            self.std_final_length(),
            self.min_final_length(),
            self.max_final_length(),
            self.mean_greens(),
            self.mean_reds(),
            self.deaths(),
        )
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = EvalStats::new();
        assert_eq!(stats.episodes(), 0);
        assert_eq!(stats.deaths(), 0);
        assert_eq!(stats.mean_final_length(), 0.0);
        assert_eq!(stats.std_final_length(), 0.0);
        assert_eq!(stats.min_final_length(), 0);
        assert_eq!(stats.max_final_length(), 0);
    }

    #[test]
    fn test_record_and_means() {
        let mut stats = EvalStats::new();
        stats.record_episode(3, 1, 0, true);
        stats.record_episode(7, 5, 2, false);

        assert_eq!(stats.episodes(), 2);
        assert_eq!(stats.deaths(), 1);
        assert!((stats.mean_final_length() - 5.0).abs() < 1e-9);
        assert!((stats.mean_greens() - 3.0).abs() < 1e-9);
        assert!((stats.mean_reds() - 1.0).abs() < 1e-9);
        assert_eq!(stats.min_final_length(), 3);
        assert_eq!(stats.max_final_length(), 7);
    }

    #[test]
    fn test_std() {
        let mut stats = EvalStats::new();
        stats.record_episode(3, 0, 0, false);
        stats.record_episode(7, 0, 0, false);

        // Population std of {3, 7} is 2
        assert!((stats.std_final_length() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = EvalStats::new();
        stats.record_episode(4, 2, 1, true);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Len: 4.000"));
        assert!(summary.contains("Deaths: 1"));
    }
}
