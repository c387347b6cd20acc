pub mod eval_stats;
pub mod game_metrics;
pub mod training_stats;

pub use eval_stats::EvalStats;
pub use game_metrics::GameMetrics;
pub use training_stats::TrainingStats;
