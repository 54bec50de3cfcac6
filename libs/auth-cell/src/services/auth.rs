use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{AppState, DoctorRepository, Store, StoreError, UserRepository};
use shared_models::auth::Role;
use shared_models::doctor::DoctorProfile;
use shared_models::user::{normalize_email, PublicUser, UserAccount};
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::password::{PasswordService, MIN_PASSWORD_LENGTH};

const DEFAULT_SPECIALTY: &str = "General Practice";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_pattern().is_match(email)
}

pub struct AuthService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            config: state.config.clone(),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);
        debug!("Registering user {}", email);

        if request.name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if !is_valid_email(&email) {
            return Err(AuthError::Validation("Please include a valid email".to_string()));
        }
        if !PasswordService::is_long_enough(&request.password) {
            return Err(AuthError::Validation(format!(
                "Please enter a password with {} or more characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let role = request.role.unwrap_or(Role::Patient);
        if role == Role::Admin {
            return Err(AuthError::Validation("Admin accounts cannot be self-registered".to_string()));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = PasswordService::hash_password(&request.password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let mut account = UserAccount::new(&request.name, &email, password_hash, role);
        account.phone = request.phone.filter(|p| !p.trim().is_empty());

        let account = match self.store.insert_user(account).await {
            Ok(account) => account,
            Err(StoreError::Duplicate(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        };

        if role == Role::Doctor {
            let specialty = request
                .specialty
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SPECIALTY);
            self.store
                .upsert_doctor(DoctorProfile::new(account.id, &account.name, specialty))
                .await?;
        }

        info!("Registered {} {}", account.role, account.id);
        self.session_for(&account)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);

        let account = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = PasswordService::verify_password(&request.password, &account.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !matches {
            warn!("Failed login for {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        info!("User {} logged in", account.id);
        self.session_for(&account)
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<PublicUser, AuthError> {
        self.store
            .find_user(user_id)
            .await?
            .map(|account| account.to_public())
            .ok_or(AuthError::UserNotFound)
    }

    fn session_for(&self, account: &UserAccount) -> Result<AuthResponse, AuthError> {
        let issued = issue_token(
            account.id,
            account.role,
            Some(&account.email),
            &self.config.jwt_secret,
            self.config.jwt_expiry_hours,
        )
        .map_err(AuthError::Token)?;

        Ok(AuthResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user: account.to_public(),
        })
    }
}
