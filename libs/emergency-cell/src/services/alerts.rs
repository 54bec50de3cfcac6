use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use shared_database::{AppState, EmergencyRepository, Store};
use shared_models::access::{authorize, Action, Relation, Resource};
use shared_models::auth::User;
use shared_models::emergency::{Emergency, EmergencyStatus};
use shared_models::error::AppError;

use crate::models::{CreateAlertRequest, EmergencyError, UpdateEmergencyStatusRequest};

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub struct EmergencyService {
    store: Arc<dyn Store>,
}

impl EmergencyService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn create_alert(&self, caller: &User, request: CreateAlertRequest) -> Result<Emergency, EmergencyError> {
        let (Some(location), Some(description)) = (non_blank(request.location), non_blank(request.description)) else {
            return Err(EmergencyError::MissingDetails);
        };

        let emergency = self
            .store
            .insert_emergency(Emergency::new(caller.id, &location, &description))
            .await?;

        warn!("Emergency {} raised by {} at {}", emergency.id, caller.id, emergency.location);
        Ok(emergency)
    }

    async fn owned(&self, caller: &User, id: Uuid, action: Action) -> Result<Emergency, AppError> {
        let emergency = self
            .store
            .find_emergency(id)
            .await
            .map_err(EmergencyError::from)?
            .ok_or(EmergencyError::NotFound)?;
        authorize(caller, Resource::Emergency, action, Relation::for_owner(caller.id, emergency.user_id))?;
        Ok(emergency)
    }

    pub async fn status(&self, caller: &User, id: Uuid) -> Result<Emergency, AppError> {
        self.owned(caller, id, Action::Read).await
    }

    pub async fn update_status(
        &self,
        caller: &User,
        id: Uuid,
        request: UpdateEmergencyStatusRequest,
    ) -> Result<Emergency, AppError> {
        let status: EmergencyStatus = non_blank(request.status)
            .ok_or(EmergencyError::MissingStatus)?
            .parse()
            .map_err(EmergencyError::InvalidStatus)?;

        let mut emergency = self.owned(caller, id, Action::Update).await?;
        emergency.status = status;
        let saved = self
            .store
            .update_emergency(emergency)
            .await
            .map_err(EmergencyError::from)?;

        info!("Emergency {} is now {:?}", saved.id, saved.status);
        Ok(saved)
    }
}
