pub mod evaluate;
pub mod human;
pub mod train;
pub mod visualize;

pub use evaluate::{EvalConfig, EvalMode};
pub use human::HumanMode;
pub use train::{TrainConfig, TrainMode};
pub use visualize::{VisualizeConfig, VisualizeMode};
