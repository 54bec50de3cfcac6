pub mod analyzer;
pub mod predictor;

pub use analyzer::analyze;
pub use predictor::predict;
