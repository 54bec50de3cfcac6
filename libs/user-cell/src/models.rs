use serde::Deserialize;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "medicalHistory")]
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicalHistoryRequest {
    #[serde(alias = "medicalHistory")]
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default, alias = "currentPassword")]
    pub current_password: String,
    #[serde(default, alias = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("{0}")]
    Validation(String),

    #[error("Email already in use")]
    EmailTaken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound("User not found".to_string()),
            UserError::WrongPassword => AppError::ValidationError(err.to_string()),
            UserError::Validation(msg) => AppError::ValidationError(msg),
            UserError::EmailTaken => AppError::Conflict(err.to_string()),
            UserError::Hashing(msg) => AppError::Internal(msg),
            UserError::Store(e) => e.into(),
        }
    }
}
