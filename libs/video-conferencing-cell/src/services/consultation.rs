use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::{AppState, AppointmentRepository, Store, UserRepository};
use shared_models::access::{authorize, Action, Resource};
use shared_models::appointment::{Appointment, AppointmentStatus, ConsultationType};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{Room, VideoError};
use crate::services::twilio::TwilioVideoClient;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSession {
    pub token: String,
    pub room_name: String,
    pub appointment: Appointment,
}

pub struct VideoConsultationService {
    store: Arc<dyn Store>,
    client: Result<TwilioVideoClient, VideoError>,
}

impl VideoConsultationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            client: TwilioVideoClient::new(&state.config),
        }
    }

    fn client(&self) -> Result<&TwilioVideoClient, VideoError> {
        self.client.as_ref().map_err(|_| VideoError::NotConfigured)
    }

    async fn appointment(&self, id: Uuid) -> Result<Appointment, VideoError> {
        self.store
            .find_appointment(id)
            .await?
            .ok_or(VideoError::AppointmentNotFound)
    }

    async fn video_appointment(&self, caller: &User, id: Uuid, action: Action) -> Result<Appointment, AppError> {
        let appointment = self.appointment(id).await?;
        if appointment.consultation_type != ConsultationType::Video {
            return Err(VideoError::NotVideoConsultation.into());
        }
        authorize(caller, Resource::VideoRoom, action, appointment.relation_to(caller.id))?;
        Ok(appointment)
    }

    /// Display name for the token identity, falling back to the user id.
    async fn identity_of(&self, caller: &User) -> String {
        match self.store.find_user(caller.id).await {
            Ok(Some(account)) => account.name,
            Ok(None) => caller.id.to_string(),
            Err(e) => {
                warn!("Could not load user {} for video identity: {}", caller.id, e);
                caller.id.to_string()
            }
        }
    }

    /// Issues a room token and makes sure the room exists.
    pub async fn join(&self, caller: &User, appointment_id: Uuid) -> Result<VideoSession, AppError> {
        let appointment = self.video_appointment(caller, appointment_id, Action::Join).await?;
        let client = self.client()?;

        let room_name = appointment.room_name();
        let identity = self.identity_of(caller).await;
        let token = client.generate_token(&identity, &room_name)?;

        if let Err(e) = client.create_room(&room_name).await {
            info!("Room {} not created, it may already exist: {}", room_name, e);
        }

        info!("Issued video token for {} in {}", caller.id, room_name);
        Ok(VideoSession {
            token,
            room_name,
            appointment,
        })
    }

    /// Completes the provider room and the appointment.
    pub async fn end(&self, caller: &User, appointment_id: Uuid) -> Result<Appointment, AppError> {
        let mut appointment = self.appointment(appointment_id).await?;
        authorize(caller, Resource::VideoRoom, Action::End, appointment.relation_to(caller.id))?;

        self.client()?.end_room(&appointment.room_name()).await?;

        appointment.status = AppointmentStatus::Completed;
        let saved = self.store.update_appointment(appointment).await?;
        info!("Video consultation for appointment {} ended", saved.id);
        Ok(saved)
    }

    pub async fn room_status(&self, caller: &User, appointment_id: Uuid) -> Result<Room, AppError> {
        let appointment = self.appointment(appointment_id).await?;
        authorize(caller, Resource::VideoRoom, Action::Read, appointment.relation_to(caller.id))?;

        Ok(self.client()?.get_room(&appointment.room_name()).await?)
    }

    pub async fn appointment_details(&self, caller: &User, appointment_id: Uuid) -> Result<Appointment, AppError> {
        self.video_appointment(caller, appointment_id, Action::Read).await
    }
}
