pub mod alerts;

pub use alerts::EmergencyService;
