use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Relation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefundDetails {
    /// Minor currency units.
    pub amount: i64,
    pub reason: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: String,
    /// Unique. For processor-created payments this is the payment intent id.
    pub transaction_id: String,
    pub refund_details: Option<RefundDetails>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn relation_to(&self, user_id: Uuid) -> Relation {
        Relation::for_participants(user_id, self.patient_id, self.doctor_id)
    }

    pub fn is_refunded(&self) -> bool {
        self.status == PaymentStatus::Refunded
    }
}
