//! Keyword symptom analysis, a small fixed-vocabulary predictor and SMS
//! follow-ups. Nothing here is a diagnosis.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::{analyze, predict};
