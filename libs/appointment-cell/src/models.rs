use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::models::DoctorError;
use shared_database::StoreError;
use shared_models::appointment::{AppointmentStatus, ConsultationType};
use shared_models::error::AppError;

/// Booking form. Everything is optional at the wire level so that missing
/// fields produce one validation message instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookAppointmentRequest {
    #[serde(default, alias = "patientName")]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default, alias = "doctorId")]
    pub doctor_id: Option<Uuid>,
    #[serde(default, alias = "consultationType")]
    pub consultation_type: Option<ConsultationType>,
    #[serde(default, alias = "endTime")]
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Please fill in all required fields")]
    MissingFields,

    #[error("Cannot book appointment for past dates")]
    PastDate,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("{0}")]
    InvalidStatus(String),

    #[error("You already have an appointment at this time")]
    AlreadyBooked,

    #[error("Selected time slot is not available")]
    SlotUnavailable,

    #[error("Cannot cancel a completed appointment")]
    CannotCancelCompleted,

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound => AppError::NotFound(err.to_string()),
            BookingError::MissingFields
            | BookingError::PastDate
            | BookingError::InvalidDate(_)
            | BookingError::InvalidTime(_)
            | BookingError::InvalidStatus(_) => AppError::ValidationError(err.to_string()),
            BookingError::AlreadyBooked | BookingError::SlotUnavailable => {
                AppError::Conflict(err.to_string())
            }
            BookingError::CannotCancelCompleted | BookingError::InvalidTransition { .. } => {
                AppError::InvalidState(err.to_string())
            }
            BookingError::Doctor(e) => e.into(),
            BookingError::Store(e) => e.into(),
        }
    }
}
