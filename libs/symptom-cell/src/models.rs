use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use notification_cell::models::NotificationError;
use shared_models::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SymptomSmsRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_matches(count: usize) -> Self {
        match count {
            0 | 1 => Severity::Low,
            2 => Severity::Medium,
            _ => Severity::High,
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Severity::High => "You have multiple symptoms. Please consider consulting a doctor soon.",
            Severity::Medium => "Monitor your symptoms and seek medical attention if they worsen.",
            Severity::Low => {
                "Your symptoms appear mild. Try the recommended remedies and seek help if symptoms persist."
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Analysis {
    pub conditions: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
    pub severity: Severity,
    pub matched_symptoms: Vec<&'static str>,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum SymptomError {
    #[error("Please provide symptoms")]
    MissingSymptoms,

    #[error("No recognized symptoms found")]
    NoRecognizedSymptoms,

    #[error("Invalid symptoms detected")]
    InvalidSymptoms(Vec<String>),

    #[error("Phone number is required")]
    MissingPhone,

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl From<SymptomError> for AppError {
    fn from(err: SymptomError) -> Self {
        match err {
            SymptomError::Notification(e) => e.into(),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}

impl IntoResponse for SymptomError {
    fn into_response(self) -> Response {
        match self {
            SymptomError::InvalidSymptoms(invalid) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Invalid symptoms detected",
                    "invalid_symptoms": invalid,
                    "message": "Please only select from the available symptoms: fever, cough, headache"
                })),
            )
                .into_response(),
            other => AppError::from(other).into_response(),
        }
    }
}
