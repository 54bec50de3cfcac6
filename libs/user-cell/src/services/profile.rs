use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use auth_cell::services::auth::is_valid_email;
use auth_cell::services::password::{PasswordService, MIN_PASSWORD_LENGTH};
use shared_database::{Store, StoreError, UserRepository};
use shared_models::access::{authorize, Action, Relation, Resource};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::user::{normalize_email, PublicUser, UserAccount};

use crate::models::{ChangePasswordRequest, UpdateProfileRequest, UpdateUserRequest, UserError};

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn load(&self, id: Uuid) -> Result<UserAccount, UserError> {
        self.store.find_user(id).await?.ok_or(UserError::NotFound)
    }

    async fn save(&self, account: UserAccount) -> Result<PublicUser, UserError> {
        match self.store.update_user(account).await {
            Ok(saved) => Ok(saved.to_public()),
            Err(StoreError::Duplicate(_)) => Err(UserError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<PublicUser, UserError> {
        debug!("Getting profile for user {}", user_id);
        Ok(self.load(user_id).await?.to_public())
    }

    /// Only non-blank fields are applied.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<PublicUser, UserError> {
        let mut account = self.load(user_id).await?;

        if let Some(name) = non_blank(request.name) {
            account.name = name.trim().to_string();
        }
        if let Some(phone) = non_blank(request.phone) {
            account.phone = Some(phone);
        }
        if let Some(address) = non_blank(request.address) {
            account.address = Some(address);
        }
        if let Some(history) = non_blank(request.medical_history) {
            account.medical_history = Some(history);
        }

        info!("Updated profile for user {}", user_id);
        self.save(account).await
    }

    /// Replaces the history outright, including clearing it.
    pub async fn replace_medical_history(
        &self,
        user_id: Uuid,
        medical_history: Option<String>,
    ) -> Result<PublicUser, UserError> {
        let mut account = self.load(user_id).await?;
        account.medical_history = medical_history;
        self.save(account).await
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), UserError> {
        let mut account = self.load(user_id).await?;

        let matches = PasswordService::verify_password(&request.current_password, &account.password_hash)
            .map_err(|e| UserError::Hashing(e.to_string()))?;
        if !matches {
            return Err(UserError::WrongPassword);
        }
        if !PasswordService::is_long_enough(&request.new_password) {
            return Err(UserError::Validation(format!(
                "Please enter a password with {} or more characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        account.password_hash = PasswordService::hash_password(&request.new_password)
            .map_err(|e| UserError::Hashing(e.to_string()))?;
        self.save(account).await?;

        info!("Password changed for user {}", user_id);
        Ok(())
    }

    pub async fn list_users(&self, caller: &User) -> Result<Vec<PublicUser>, AppError> {
        authorize(caller, Resource::UserAccount, Action::List, Relation::Unrelated)?;
        let users = self.store.list_users().await?;
        Ok(users.iter().map(PublicUser::from).collect())
    }

    pub async fn get_user(&self, caller: &User, id: Uuid) -> Result<PublicUser, AppError> {
        let account = self.load(id).await?;
        authorize(caller, Resource::UserAccount, Action::Read, Relation::for_owner(caller.id, id))?;
        Ok(account.to_public())
    }

    pub async fn update_user(
        &self,
        caller: &User,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<PublicUser, AppError> {
        let mut account = self.load(id).await?;
        authorize(caller, Resource::UserAccount, Action::Update, Relation::for_owner(caller.id, id))?;

        if let Some(name) = non_blank(request.name) {
            account.name = name.trim().to_string();
        }
        if let Some(email) = non_blank(request.email) {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(UserError::Validation("Please include a valid email".to_string()).into());
            }
            account.email = email;
        }
        if let Some(phone) = non_blank(request.phone) {
            account.phone = Some(phone);
        }

        Ok(self.save(account).await?)
    }
}
