pub mod curves;
pub mod evaluator;
pub mod penalties;
pub mod heuristics;

pub use evaluator::{FitnessBreakdown, FitnessEvaluator};
pub use penalties::PenaltyReport;
pub use heuristics::SoftScores;
