use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public directory entry for a doctor. When the doctor registered through
/// auth the profile id equals their user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub experience: Option<String>,
    pub education: Option<String>,
    /// Minor currency units.
    pub consultation_fee: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl DoctorProfile {
    pub fn new(id: Uuid, name: &str, specialty: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            specialty: specialty.to_string(),
            experience: None,
            education: None,
            consultation_fee: None,
            created_at: Utc::now(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("Dr. {}", self.name)
    }
}
