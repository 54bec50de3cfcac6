use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EmergencyStatus {
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl FromStr for EmergencyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EmergencyStatus::Active),
            "in-progress" => Ok(EmergencyStatus::InProgress),
            "resolved" => Ok(EmergencyStatus::Resolved),
            "cancelled" => Ok(EmergencyStatus::Cancelled),
            other => Err(format!("Invalid emergency status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emergency {
    pub id: Uuid,
    pub user_id: Uuid,
    pub location: String,
    pub description: String,
    pub status: EmergencyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Emergency {
    pub fn new(user_id: Uuid, location: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            location: location.to_string(),
            description: description.to_string(),
            status: EmergencyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}
