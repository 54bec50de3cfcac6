use std::collections::HashMap;

use headers::{Header, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::payment::Payment;

/// Manually recorded payment.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentRequest {
    #[serde(default, alias = "appointment", alias = "appointmentId")]
    pub appointment_id: Option<Uuid>,
    /// Minor currency units.
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default, alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(default, alias = "transactionId")]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    #[serde(alias = "appointmentId")]
    pub appointment_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessorRefundRequest {
    /// Minor units; the full payment when absent.
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: Option<String>,
    pub payment_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub payment: Payment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<PaymentIntent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorDetail {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

static STRIPE_SIGNATURE: HeaderName = HeaderName::from_static("stripe-signature");

/// Raw `Stripe-Signature` header value.
#[derive(Debug, Clone)]
pub struct StripeSignature(pub String);

impl Header for StripeSignature {
    fn name() -> &'static HeaderName {
        &STRIPE_SIGNATURE
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let text = value.to_str().map_err(|_| headers::Error::invalid())?;
        Ok(StripeSignature(text.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: Value,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment not found")]
    NotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Payment amount does not match appointment amount")]
    AmountMismatch,

    #[error("Payment already refunded")]
    AlreadyRefunded,

    #[error("Transaction already recorded")]
    DuplicateTransaction,

    #[error("Stripe is not configured. Please set STRIPE_SECRET_KEY in environment variables.")]
    NotConfigured,

    #[error("Webhook secret is not configured")]
    WebhookNotConfigured,

    #[error("Webhook Error: {0}")]
    InvalidSignature(String),

    #[error("Payment processor error: {0}")]
    Processor(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Processor(err.to_string())
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound | PaymentError::AppointmentNotFound => AppError::NotFound(err.to_string()),
            PaymentError::Validation(msg) => AppError::ValidationError(msg),
            PaymentError::AmountMismatch | PaymentError::InvalidSignature(_) => AppError::BadRequest(err.to_string()),
            PaymentError::AlreadyRefunded => AppError::InvalidState(err.to_string()),
            PaymentError::DuplicateTransaction => AppError::Conflict(err.to_string()),
            PaymentError::NotConfigured | PaymentError::WebhookNotConfigured | PaymentError::Processor(_) => {
                AppError::ExternalService(err.to_string())
            }
            PaymentError::Store(e) => e.into(),
        }
    }
}
