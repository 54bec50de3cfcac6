use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::medical_record::{Attachment, LabReport, Prescription, Vitals};

#[derive(Debug, Default, Deserialize)]
pub struct PrescriptionEntry {
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl PrescriptionEntry {
    fn field(value: Option<String>, message: &str) -> Result<String, MedicalRecordError> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MedicalRecordError::Validation(message.to_string()))
    }

    pub fn into_prescription(self) -> Result<Prescription, MedicalRecordError> {
        Ok(Prescription {
            medicine: Self::field(self.medicine, "Medicine name is required")?,
            dosage: Self::field(self.dosage, "Dosage is required")?,
            duration: Self::field(self.duration, "Duration is required")?,
            instructions: self.instructions,
        })
    }
}

pub fn prescriptions(entries: Vec<PrescriptionEntry>) -> Result<Vec<Prescription>, MedicalRecordError> {
    entries.into_iter().map(PrescriptionEntry::into_prescription).collect()
}

#[derive(Debug, Deserialize)]
pub struct AttachmentEntry {
    pub name: String,
    #[serde(alias = "fileUrl")]
    pub file_url: String,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

impl From<AttachmentEntry> for Attachment {
    fn from(entry: AttachmentEntry) -> Self {
        Attachment {
            name: entry.name,
            file_url: entry.file_url,
            kind: entry.kind,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateMedicalRecordRequest {
    #[serde(default, alias = "patientId")]
    pub patient: Option<Uuid>,
    #[serde(default, alias = "appointmentId")]
    pub appointment: Option<Uuid>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub prescription: Option<Vec<PrescriptionEntry>>,
    #[serde(default, alias = "labReports")]
    pub lab_reports: Vec<LabReport>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "followUpDate")]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Vec<AttachmentEntry>,
}

/// Present fields replace the stored ones.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMedicalRecordRequest {
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub prescription: Option<Vec<PrescriptionEntry>>,
    #[serde(default, alias = "labReports")]
    pub lab_reports: Option<Vec<LabReport>>,
    #[serde(default)]
    pub vitals: Option<Vitals>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "followUpDate")]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentEntry>>,
}

#[derive(Debug, Error)]
pub enum MedicalRecordError {
    #[error("Medical record not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MedicalRecordError> for AppError {
    fn from(err: MedicalRecordError) -> Self {
        match err {
            MedicalRecordError::NotFound => AppError::NotFound(err.to_string()),
            MedicalRecordError::Validation(msg) => AppError::ValidationError(msg),
            MedicalRecordError::Store(e) => e.into(),
        }
    }
}
