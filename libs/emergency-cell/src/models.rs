use serde::Deserialize;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct CreateAlertRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEmergencyStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Error)]
pub enum EmergencyError {
    #[error("Emergency not found")]
    NotFound,

    #[error("Please provide location and description")]
    MissingDetails,

    #[error("Please provide status")]
    MissingStatus,

    #[error("{0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EmergencyError> for AppError {
    fn from(err: EmergencyError) -> Self {
        match err {
            EmergencyError::NotFound => AppError::NotFound(err.to_string()),
            EmergencyError::MissingDetails | EmergencyError::MissingStatus => {
                AppError::ValidationError(err.to_string())
            }
            EmergencyError::InvalidStatus(msg) => AppError::ValidationError(msg),
            EmergencyError::Store(e) => e.into(),
        }
    }
}
