use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Relation;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub medicine: String,
    pub dosage: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Prescription {
    pub fn is_complete(&self) -> bool {
        !self.medicine.trim().is_empty()
            && !self.dosage.trim().is_empty()
            && !self.duration.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabReport {
    pub name: String,
    pub file_url: String,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Vitals {
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub file_url: String,
    pub kind: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub diagnosis: String,
    pub prescription: Vec<Prescription>,
    #[serde(default)]
    pub lab_reports: Vec<LabReport>,
    #[serde(default)]
    pub vitals: Vitals,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MedicalRecord {
    pub fn relation_to(&self, user_id: Uuid) -> Relation {
        Relation::for_participants(user_id, self.patient_id, Some(self.doctor_id))
    }
}

/// Which records a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicalRecordFilter {
    All,
    Patient(Uuid),
    Doctor(Uuid),
}

impl MedicalRecordFilter {
    pub fn matches(&self, record: &MedicalRecord) -> bool {
        match self {
            MedicalRecordFilter::All => true,
            MedicalRecordFilter::Patient(id) => record.patient_id == *id,
            MedicalRecordFilter::Doctor(id) => record.doctor_id == *id,
        }
    }
}
