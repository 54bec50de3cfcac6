use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{AppState, DoctorRepository, NotificationRepository, Store, UserRepository};
use shared_models::access::{authorize, Action, Relation, Resource};
use shared_models::appointment::{Appointment, ConsultationType};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::notification::{Notification, NotificationPriority, NotificationType, RelatedModel};
use shared_models::payment::{Payment, PaymentStatus};

use crate::models::NotificationError;
use crate::services::email::EmailClient;

fn consultation_label(kind: ConsultationType) -> &'static str {
    match kind {
        ConsultationType::Video => "video",
        ConsultationType::InPerson => "in-person",
    }
}

fn time_range(appointment: &Appointment) -> String {
    match &appointment.slot_end {
        Some(end) => format!("{} - {}", appointment.time, end),
        None => appointment.time.clone(),
    }
}

pub struct NotificationService {
    store: Arc<dyn Store>,
    email: Option<EmailClient>,
}

impl NotificationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            email: EmailClient::new(&state.config).ok(),
        }
    }

    pub async fn create_notification(&self, notification: Notification) -> Result<Notification, NotificationError> {
        let saved = self.store.insert_notification(notification).await?;
        debug!("Notification {} created for {}", saved.id, saved.recipient_id);
        Ok(saved)
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), NotificationError> {
        match &self.email {
            Some(client) => client.send_email(to, subject, html).await,
            None => Err(NotificationError::NotConfigured("Email")),
        }
    }

    /// Email failures never fail the caller.
    async fn email_quietly(&self, to: Option<&str>, subject: &str, html: &str) {
        let Some(to) = to else {
            return;
        };
        if self.email.is_none() {
            debug!("Email not configured, skipping '{}' to {}", subject, to);
            return;
        }
        if let Err(e) = self.send_email(to, subject, html).await {
            warn!("Failed to send '{}' to {}: {}", subject, to, e);
        }
    }

    async fn email_of(&self, user_id: Uuid) -> Option<String> {
        match self.store.find_user(user_id).await {
            Ok(found) => found.map(|u| u.email),
            Err(e) => {
                warn!("Could not load user {} for email: {}", user_id, e);
                None
            }
        }
    }

    pub async fn notify_new_appointment(&self, appointment: &Appointment) -> Result<(), NotificationError> {
        let Some(doctor_id) = appointment.doctor_id else {
            return Ok(());
        };

        let doctor_name = self
            .store
            .find_doctor(doctor_id)
            .await?
            .map(|d| d.name)
            .unwrap_or_else(|| "your doctor".to_string());

        self.create_notification(
            Notification::new(
                doctor_id,
                NotificationType::Appointment,
                "New Appointment",
                &format!("New appointment scheduled with {}", appointment.patient_name),
            )
            .related(appointment.id, RelatedModel::Appointment)
            .with_action_url(format!("/appointments/{}", appointment.id)),
        )
        .await?;

        self.create_notification(
            Notification::new(
                appointment.patient_id,
                NotificationType::Appointment,
                "Appointment Booked",
                &format!("Your appointment with Dr. {} has been booked", doctor_name),
            )
            .related(appointment.id, RelatedModel::Appointment)
            .with_action_url(format!("/appointments/{}", appointment.id)),
        )
        .await?;

        let details = format!(
            "<p>Date: {}</p><p>Time: {}</p><p>Type: {}</p>",
            appointment.date.format("%Y-%m-%d"),
            time_range(appointment),
            consultation_label(appointment.consultation_type)
        );

        let doctor_email = self.email_of(doctor_id).await;
        self.email_quietly(
            doctor_email.as_deref(),
            "New Appointment",
            &format!(
                "<h2>New Appointment</h2><p>You have a new appointment with {}</p>{}",
                appointment.patient_name, details
            ),
        )
        .await;

        let patient_email = self.email_of(appointment.patient_id).await;
        self.email_quietly(
            patient_email.as_deref(),
            "Appointment Booked",
            &format!(
                "<h2>Appointment Booked</h2><p>Your appointment with Dr. {} has been booked</p>{}",
                doctor_name, details
            ),
        )
        .await;

        info!("Sent new-appointment notifications for {}", appointment.id);
        Ok(())
    }

    pub async fn notify_payment(&self, payment: &Payment, appointment: &Appointment) -> Result<(), NotificationError> {
        let status = match payment.status {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        };
        let message = format!("Payment {} for appointment on {}", status, appointment.date.format("%Y-%m-%d"));
        let priority = if payment.status == PaymentStatus::Failed {
            NotificationPriority::High
        } else {
            NotificationPriority::Medium
        };

        let mut recipients = vec![appointment.patient_id];
        recipients.extend(appointment.doctor_id);

        let html = format!(
            "<h2>Payment Update</h2><p>{}</p><p>Amount: {:.2} {}</p>",
            message,
            payment.amount as f64 / 100.0,
            payment.currency.to_uppercase()
        );

        for recipient in recipients {
            self.create_notification(
                Notification::new(recipient, NotificationType::Payment, "Payment Update", &message)
                    .related(payment.id, RelatedModel::Payment)
                    .with_priority(priority),
            )
            .await?;

            let email = self.email_of(recipient).await;
            self.email_quietly(email.as_deref(), "Payment Update", &html).await;
        }

        info!("Sent payment notifications for {}", payment.id);
        Ok(())
    }

    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.store.list_notifications(user_id).await?)
    }

    pub async fn mark_read(&self, caller: &User, id: Uuid) -> Result<Notification, AppError> {
        let mut notification = self
            .store
            .find_notification(id)
            .await?
            .ok_or(NotificationError::NotFound)?;
        authorize(
            caller,
            Resource::Notification,
            Action::Update,
            Relation::for_owner(caller.id, notification.recipient_id),
        )?;

        notification.read = true;
        Ok(self.store.update_notification(notification).await?)
    }
}

/// Sends new-appointment notifications in the background; failures are only logged.
pub fn spawn_new_appointment_notifications(state: &AppState, appointment: Appointment) {
    let service = NotificationService::new(state);
    tokio::spawn(async move {
        if let Err(e) = service.notify_new_appointment(&appointment).await {
            warn!("New-appointment notifications for {} failed: {}", appointment.id, e);
        }
    });
}

pub fn spawn_payment_notifications(state: &AppState, payment: Payment, appointment: Appointment) {
    let service = NotificationService::new(state);
    tokio::spawn(async move {
        if let Err(e) = service.notify_payment(&payment, &appointment).await {
            warn!("Payment notifications for {} failed: {}", payment.id, e);
        }
    });
}
