use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(alias = "appointmentId")]
    pub appointment_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoGrant {
    pub room: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Grants {
    pub identity: String,
    pub video: VideoGrant,
}

/// Payload of a Twilio access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub jti: String,
    /// API key sid.
    pub iss: String,
    /// Account sid.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub grants: Grants,
}

/// Room resource as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub sid: String,
    pub unique_name: String,
    pub status: String,
    #[serde(default, rename = "type")]
    pub room_type: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub max_participants: Option<i64>,
}

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("This appointment is not a video consultation")]
    NotVideoConsultation,

    #[error("Video room not found")]
    RoomNotFound,

    #[error("Video service is not configured")]
    NotConfigured,

    #[error("Video provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to sign access token: {0}")]
    Token(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for VideoError {
    fn from(err: reqwest::Error) -> Self {
        VideoError::Provider {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            message: err.to_string(),
        }
    }
}

impl From<VideoError> for AppError {
    fn from(err: VideoError) -> Self {
        match err {
            VideoError::AppointmentNotFound | VideoError::RoomNotFound => AppError::NotFound(err.to_string()),
            VideoError::NotVideoConsultation => AppError::BadRequest(err.to_string()),
            VideoError::NotConfigured | VideoError::Provider { .. } => AppError::ExternalService(err.to_string()),
            VideoError::Token(msg) => AppError::Internal(msg),
            VideoError::Store(e) => e.into(),
        }
    }
}
