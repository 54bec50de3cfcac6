use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Relation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Which rule set governs appointment status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may follow any status.
    Permissive,
    /// pending -> confirmed -> completed; anything not completed -> cancelled.
    Strict,
}

const STRICT_TRANSITIONS: &[(AppointmentStatus, AppointmentStatus)] = &[
    (AppointmentStatus::Pending, AppointmentStatus::Confirmed),
    (AppointmentStatus::Pending, AppointmentStatus::Cancelled),
    (AppointmentStatus::Confirmed, AppointmentStatus::Completed),
    (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled),
];

impl AppointmentStatus {
    /// Pending and confirmed appointments hold their (date, time).
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus, policy: TransitionPolicy) -> bool {
        match policy {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => {
                *self == next || STRICT_TRANSITIONS.contains(&(*self, next))
            }
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("Invalid appointment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConsultationType {
    #[default]
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "in-person")]
    InPerson,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentPaymentStatus {
    #[default]
    Unpaid,
    Pending,
    Paid,
    Completed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Option<Uuid>,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    /// End of the availability slot claimed for this appointment, if any.
    pub slot_end: Option<String>,
    pub consultation_type: ConsultationType,
    pub symptoms: String,
    pub status: AppointmentStatus,
    pub payment_status: AppointmentPaymentStatus,
    /// Consultation fee in minor currency units.
    pub fee: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// New pending, unpaid appointment.
    pub fn new(
        patient_id: Uuid,
        patient_name: &str,
        doctor_id: Option<Uuid>,
        date: NaiveDate,
        time: &str,
        symptoms: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            patient_name: patient_name.to_string(),
            doctor_id,
            date,
            time: time.to_string(),
            slot_end: None,
            consultation_type: ConsultationType::default(),
            symptoms: symptoms.to_string(),
            status: AppointmentStatus::Pending,
            payment_status: AppointmentPaymentStatus::default(),
            fee: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn relation_to(&self, user_id: Uuid) -> Relation {
        Relation::for_participants(user_id, self.patient_id, self.doctor_id)
    }

    pub fn room_name(&self) -> String {
        format!("appointment-{}", self.id)
    }

    /// True when both appointments would occupy the same (date, time) for a shared party.
    pub fn clashes_with(&self, other: &Appointment) -> bool {
        if self.id == other.id || !self.status.is_active() || !other.status.is_active() {
            return false;
        }
        if self.date != other.date || self.time != other.time {
            return false;
        }
        let same_doctor = matches!((self.doctor_id, other.doctor_id), (Some(a), Some(b)) if a == b);
        self.patient_id == other.patient_id || same_doctor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_allows_everything() {
        assert!(AppointmentStatus::Completed
            .can_transition_to(AppointmentStatus::Pending, TransitionPolicy::Permissive));
        assert!(AppointmentStatus::Cancelled
            .can_transition_to(AppointmentStatus::Confirmed, TransitionPolicy::Permissive));
    }

    #[test]
    fn strict_follows_the_table() {
        let strict = TransitionPolicy::Strict;
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Confirmed, strict));
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Completed, strict));
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Cancelled, strict));
        assert!(!AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Completed, strict));
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Cancelled, strict));
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Pending, strict));
    }

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert_eq!("confirmed".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Confirmed));
        assert!("no_show".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn clash_needs_shared_party_and_active_status() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
        let doctor = Uuid::new_v4();
        let first = Appointment::new(Uuid::new_v4(), "A", Some(doctor), date, "09:00", "cough");
        let mut second = Appointment::new(Uuid::new_v4(), "B", Some(doctor), date, "09:00", "fever");
        assert!(first.clashes_with(&second));

        second.status = AppointmentStatus::Cancelled;
        assert!(!first.clashes_with(&second));

        let unrelated = Appointment::new(Uuid::new_v4(), "C", None, date, "09:00", "rash");
        assert!(!first.clashes_with(&unrelated));
    }

    #[test]
    fn consultation_type_uses_hyphenated_names() {
        let json = serde_json::to_string(&ConsultationType::InPerson).unwrap();
        assert_eq!(json, "\"in-person\"");
    }
}
