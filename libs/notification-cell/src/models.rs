use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

/// Body posted to the mail relay.
#[derive(Debug, Serialize)]
pub struct EmailMessage<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub html: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SmsResponse {
    pub sid: String,
    pub status: Option<String>,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Provider(err.to_string())
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => AppError::NotFound("Notification not found".to_string()),
            NotificationError::NotConfigured(_) | NotificationError::Provider(_) => {
                AppError::ExternalService(err.to_string())
            }
            NotificationError::Validation(msg) => AppError::ValidationError(msg),
            NotificationError::Store(e) => e.into(),
        }
    }
}
