use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::availability::{BreakTime, TimeSlot};
use shared_models::error::AppError;

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// 0 = Sunday .. 6 = Saturday. Without it the whole week is returned.
    pub day: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityRequest {
    #[serde(alias = "dayOfWeek")]
    pub day_of_week: u8,
    #[serde(alias = "timeSlots")]
    pub time_slots: Vec<TimeSlot>,
    #[serde(alias = "isAvailable")]
    pub is_available: Option<bool>,
    #[serde(default, alias = "breakTime")]
    pub break_time: Vec<BreakTime>,
}

/// An open slot as shown to patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotView {
    pub start: String,
    pub end: String,
}

impl From<&TimeSlot> for SlotView {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start: slot.start.clone(),
            end: slot.end.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid availability: {0}")]
    InvalidAvailability(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::InvalidAvailability(msg) => AppError::ValidationError(msg),
            DoctorError::Store(e) => e.into(),
        }
    }
}
