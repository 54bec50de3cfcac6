//! Repository traits implemented by every storage backend.
//!
//! Handlers and services only ever see `Arc<dyn Store>`; the backend is
//! picked once at startup (see [`crate::state::AppState::from_config`]).

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use shared_models::appointment::Appointment;
use shared_models::availability::DoctorAvailability;
use shared_models::doctor::DoctorProfile;
use shared_models::emergency::Emergency;
use shared_models::error::AppError;
use shared_models::medical_record::{MedicalRecord, MedicalRecordFilter};
use shared_models::notification::Notification;
use shared_models::payment::Payment;
use shared_models::user::UserAccount;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("duplicate {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            StoreError::Duplicate(what) => AppError::Conflict(format!("Duplicate {}", what)),
            StoreError::Backend(msg) => AppError::Database(msg),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Duplicate` when the email is taken.
    async fn insert_user(&self, user: UserAccount) -> StoreResult<UserAccount>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserAccount>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;
    async fn update_user(&self, user: UserAccount) -> StoreResult<UserAccount>;
    async fn list_users(&self) -> StoreResult<Vec<UserAccount>>;
}

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn list_doctors(&self) -> StoreResult<Vec<DoctorProfile>>;
    async fn find_doctor(&self, id: Uuid) -> StoreResult<Option<DoctorProfile>>;
    async fn upsert_doctor(&self, doctor: DoctorProfile) -> StoreResult<DoctorProfile>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn find_availability(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> StoreResult<Option<DoctorAvailability>>;

    /// All day documents for a doctor, ordered by day of week.
    async fn list_availability(&self, doctor_id: Uuid) -> StoreResult<Vec<DoctorAvailability>>;

    /// Insert or replace the document keyed by (doctor_id, day_of_week).
    /// An existing document keeps its id and created_at.
    async fn upsert_availability(
        &self,
        availability: DoctorAvailability,
    ) -> StoreResult<DoctorAvailability>;

    /// Atomically books the first unbooked slot covering `[start, end)`.
    /// Returns false when no such slot exists.
    async fn claim_slot(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        start: &str,
        end: &str,
    ) -> StoreResult<bool>;

    async fn release_slot(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        start: &str,
        end: &str,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Fails with `Duplicate` if another active appointment already holds the
    /// same (patient, date, time) or (doctor, date, time).
    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment>;

    /// Same uniqueness rule as insert.
    async fn update_appointment(&self, appointment: Appointment) -> StoreResult<Appointment>;

    async fn find_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>>;

    /// Sorted by (date, time) ascending.
    async fn list_appointments_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Appointment>>;

    /// Sorted by (date, time) ascending.
    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> StoreResult<Vec<Appointment>>;

    async fn find_active_for_patient(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> StoreResult<Option<Appointment>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Fails with `Duplicate` when the transaction id is already recorded.
    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment>;
    async fn find_payment(&self, id: Uuid) -> StoreResult<Option<Payment>>;
    async fn find_payment_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>>;
    async fn update_payment(&self, payment: Payment) -> StoreResult<Payment>;
    /// Payments where the user is patient or doctor, newest first.
    async fn list_payments_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Payment>>;
}

#[async_trait]
pub trait EmergencyRepository: Send + Sync {
    async fn insert_emergency(&self, emergency: Emergency) -> StoreResult<Emergency>;
    async fn find_emergency(&self, id: Uuid) -> StoreResult<Option<Emergency>>;
    async fn update_emergency(&self, emergency: Emergency) -> StoreResult<Emergency>;
}

#[async_trait]
pub trait MedicalRecordRepository: Send + Sync {
    async fn insert_medical_record(&self, record: MedicalRecord) -> StoreResult<MedicalRecord>;
    async fn find_medical_record(&self, id: Uuid) -> StoreResult<Option<MedicalRecord>>;
    async fn update_medical_record(&self, record: MedicalRecord) -> StoreResult<MedicalRecord>;
    /// Newest first.
    async fn list_medical_records(&self, filter: MedicalRecordFilter) -> StoreResult<Vec<MedicalRecord>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification>;
    async fn find_notification(&self, id: Uuid) -> StoreResult<Option<Notification>>;
    async fn update_notification(&self, notification: Notification) -> StoreResult<Notification>;
    /// Newest first.
    async fn list_notifications(&self, recipient_id: Uuid) -> StoreResult<Vec<Notification>>;
}

/// Everything the application persists.
pub trait Store:
    UserRepository
    + DoctorRepository
    + AvailabilityRepository
    + AppointmentRepository
    + PaymentRepository
    + EmergencyRepository
    + MedicalRecordRepository
    + NotificationRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + DoctorRepository
        + AvailabilityRepository
        + AppointmentRepository
        + PaymentRepository
        + EmergencyRepository
        + MedicalRecordRepository
        + NotificationRepository
{
}
