use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use notification_cell::services::notifier::spawn_payment_notifications;
use shared_database::{AppState, AppointmentRepository, PaymentRepository, Store, StoreError};
use shared_models::access::{authorize, Action, Resource};
use shared_models::appointment::{Appointment, AppointmentPaymentStatus};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::payment::{Payment, PaymentStatus, RefundDetails};

use crate::models::{
    CreatePaymentRequest, IntentResponse, PaymentError, PaymentStatusResponse, RefundRequest,
    WebhookEvent,
};
use crate::services::stripe::StripeClient;
use crate::services::webhook;

const SUCCEEDED: &str = "payment_intent.succeeded";
const FAILED: &str = "payment_intent.payment_failed";

fn required(value: Option<String>, message: &str) -> Result<String, PaymentError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PaymentError::Validation(message.to_string())),
    }
}

pub struct PaymentService {
    state: AppState,
    store: Arc<dyn Store>,
    stripe: Result<StripeClient, PaymentError>,
}

impl PaymentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            store: state.store.clone(),
            stripe: StripeClient::new(&state.config),
        }
    }

    fn stripe(&self) -> Result<&StripeClient, PaymentError> {
        self.stripe.as_ref().map_err(|_| PaymentError::NotConfigured)
    }

    fn new_payment(appointment: &Appointment, amount: i64, currency: &str, method: String, transaction_id: String) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::Pending,
            payment_method: method,
            transaction_id,
            refund_details: None,
            payment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    async fn appointment(&self, id: Uuid) -> Result<Appointment, PaymentError> {
        self.store
            .find_appointment(id)
            .await?
            .ok_or(PaymentError::AppointmentNotFound)
    }

    async fn payment(&self, id: Uuid) -> Result<Payment, PaymentError> {
        self.store.find_payment(id).await?.ok_or(PaymentError::NotFound)
    }

    async fn set_appointment_payment(&self, appointment_id: Uuid, status: AppointmentPaymentStatus) -> Result<Appointment, PaymentError> {
        let mut appointment = self.appointment(appointment_id).await?;
        appointment.payment_status = status;
        Ok(self.store.update_appointment(appointment).await?)
    }

    /// Opens a processor intent for the appointment fee and records a pending payment.
    pub async fn create_intent(&self, caller: &User, appointment_id: Uuid) -> Result<IntentResponse, AppError> {
        let appointment = self.appointment(appointment_id).await?;
        authorize(caller, Resource::Payment, Action::Create, appointment.relation_to(caller.id))?;

        let amount = appointment
            .fee
            .filter(|fee| *fee > 0)
            .ok_or_else(|| PaymentError::Validation("Appointment has no consultation fee".to_string()))?;
        let currency = self.state.config.default_currency.clone();

        let mut metadata = vec![
            ("appointmentId", appointment.id.to_string()),
            ("patientId", appointment.patient_id.to_string()),
        ];
        if let Some(doctor_id) = appointment.doctor_id {
            metadata.push(("doctorId", doctor_id.to_string()));
        }

        let intent = self
            .stripe()?
            .create_payment_intent(amount, &currency, &metadata)
            .await?;

        let payment = Self::new_payment(&appointment, amount, &currency, "card".to_string(), intent.id.clone());
        let payment = self.store.insert_payment(payment).await?;
        self.set_appointment_payment(appointment.id, AppointmentPaymentStatus::Pending).await?;

        info!("Payment {} opened for appointment {}", payment.id, appointment.id);
        Ok(IntentResponse {
            client_secret: intent.client_secret,
            payment_id: payment.id,
        })
    }

    /// Settles the payment behind a succeeded intent. Repeated deliveries are no-ops.
    pub async fn handle_successful_payment(&self, intent_id: &str) -> Result<Payment, PaymentError> {
        self.settle(intent_id, PaymentStatus::Completed, AppointmentPaymentStatus::Paid).await
    }

    async fn settle(
        &self,
        intent_id: &str,
        status: PaymentStatus,
        appointment_status: AppointmentPaymentStatus,
    ) -> Result<Payment, PaymentError> {
        let mut payment = self
            .store
            .find_payment_by_transaction(intent_id)
            .await?
            .ok_or(PaymentError::NotFound)?;

        if payment.status == status {
            return Ok(payment);
        }

        payment.status = status;
        payment.payment_date = Utc::now();
        let payment = self.store.update_payment(payment).await?;
        let appointment = self
            .set_appointment_payment(payment.appointment_id, appointment_status)
            .await?;

        info!("Payment {} is now {:?}", payment.id, payment.status);
        spawn_payment_notifications(&self.state, payment.clone(), appointment);
        Ok(payment)
    }

    /// Verifies and applies a processor event. Unhandled event types are acknowledged.
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> Result<(), PaymentError> {
        let secret = &self.state.config.stripe_webhook_secret;
        if !self.state.config.is_webhook_configured() {
            return Err(PaymentError::WebhookNotConfigured);
        }

        let event: WebhookEvent = webhook::construct_event(payload, signature, secret, Utc::now().timestamp())?;
        let intent_id = event.data.object.get("id").and_then(|v| v.as_str());

        match (event.kind.as_str(), intent_id) {
            (SUCCEEDED, Some(id)) => {
                self.handle_successful_payment(id).await?;
            }
            (FAILED, Some(id)) => {
                self.settle(id, PaymentStatus::Failed, AppointmentPaymentStatus::Unpaid).await?;
            }
            (kind, _) => info!("Ignoring webhook event {}", kind),
        }
        Ok(())
    }

    /// Refunds through the processor, fully unless `amount` is given.
    pub async fn processor_refund(&self, caller: &User, payment_id: Uuid, amount: Option<i64>) -> Result<Payment, AppError> {
        let mut payment = self.payment(payment_id).await?;
        authorize(caller, Resource::Payment, Action::Refund, payment.relation_to(caller.id))?;

        if payment.is_refunded() {
            return Err(PaymentError::AlreadyRefunded.into());
        }
        if let Some(amount) = amount {
            if amount <= 0 || amount > payment.amount {
                return Err(PaymentError::Validation("Invalid refund amount".to_string()).into());
            }
        }

        let refund = self
            .stripe()?
            .create_refund(&payment.transaction_id, amount)
            .await?;

        payment.status = PaymentStatus::Refunded;
        payment.refund_details = Some(RefundDetails {
            amount: refund.amount,
            reason: None,
            date: Utc::now(),
        });
        let payment = self.store.update_payment(payment).await?;
        self.set_appointment_payment(payment.appointment_id, AppointmentPaymentStatus::Refunded)
            .await?;

        info!("Payment {} refunded through processor ({})", payment.id, refund.id);
        Ok(payment)
    }

    /// Local record plus the processor's view of the intent when one exists.
    pub async fn status(&self, caller: &User, payment_id: Uuid) -> Result<PaymentStatusResponse, AppError> {
        let payment = self.payment(payment_id).await?;
        authorize(caller, Resource::Payment, Action::Read, payment.relation_to(caller.id))?;

        let payment_intent = match self.stripe() {
            Ok(client) if payment.transaction_id.starts_with("pi_") => {
                match client.retrieve_payment_intent(&payment.transaction_id).await {
                    Ok(intent) => Some(intent),
                    Err(e) => {
                        warn!("Could not fetch intent {}: {}", payment.transaction_id, e);
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(PaymentStatusResponse {
            payment,
            payment_intent,
        })
    }

    /// Records a payment made outside the processor flow.
    pub async fn record_payment(&self, caller: &User, request: CreatePaymentRequest) -> Result<Payment, AppError> {
        let appointment_id = request
            .appointment_id
            .ok_or_else(|| PaymentError::Validation("Appointment ID is required".to_string()))?;
        let amount = request
            .amount
            .ok_or_else(|| PaymentError::Validation("Amount is required".to_string()))?;
        let method = required(request.payment_method, "Payment method is required")?;
        let transaction_id = required(request.transaction_id, "Transaction ID is required")?;

        let appointment = self.appointment(appointment_id).await?;
        authorize(caller, Resource::Payment, Action::Create, appointment.relation_to(caller.id))?;

        if appointment.fee.is_some_and(|fee| fee != amount) {
            return Err(PaymentError::AmountMismatch.into());
        }

        let currency = self.state.config.default_currency.clone();
        let payment = Self::new_payment(&appointment, amount, &currency, method, transaction_id);
        let payment = match self.store.insert_payment(payment).await {
            Ok(payment) => payment,
            Err(StoreError::Duplicate(_)) => return Err(PaymentError::DuplicateTransaction.into()),
            Err(e) => return Err(PaymentError::from(e).into()),
        };

        self.set_appointment_payment(appointment.id, AppointmentPaymentStatus::Completed)
            .await?;
        info!("Recorded payment {} for appointment {}", payment.id, appointment.id);
        Ok(payment)
    }

    pub async fn list(&self, caller: &User) -> Result<Vec<Payment>, AppError> {
        Ok(self.store.list_payments_for_user(caller.id).await?)
    }

    pub async fn get(&self, caller: &User, payment_id: Uuid) -> Result<Payment, AppError> {
        let payment = self.payment(payment_id).await?;
        authorize(caller, Resource::Payment, Action::Read, payment.relation_to(caller.id))?;
        Ok(payment)
    }

    /// Marks a payment refunded without contacting the processor.
    pub async fn refund_record(&self, caller: &User, payment_id: Uuid, request: RefundRequest) -> Result<Payment, AppError> {
        let reason = required(request.reason, "Refund reason is required")?;
        let mut payment = self.payment(payment_id).await?;
        authorize(caller, Resource::Payment, Action::Refund, payment.relation_to(caller.id))?;

        if payment.is_refunded() {
            return Err(PaymentError::AlreadyRefunded.into());
        }

        payment.status = PaymentStatus::Refunded;
        payment.refund_details = Some(RefundDetails {
            amount: payment.amount,
            reason: Some(reason),
            date: Utc::now(),
        });
        let payment = self.store.update_payment(payment).await?;
        self.set_appointment_payment(payment.appointment_id, AppointmentPaymentStatus::Refunded)
            .await?;

        info!("Payment {} refunded by {}", payment.id, caller.id);
        Ok(payment)
    }
}
