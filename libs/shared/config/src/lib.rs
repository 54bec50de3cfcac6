use std::env;

use shared_models::appointment::TransitionPolicy;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub cors_origin: Option<String>,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base_url: String,
    pub default_currency: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_api_key: String,
    pub twilio_api_secret: String,
    pub twilio_phone_number: String,
    pub twilio_video_base_url: String,
    pub twilio_messaging_base_url: String,
    pub sms_default_country_code: String,
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
    pub transition_policy: TransitionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            jwt_secret: String::new(),
            jwt_expiry_hours: 24,
            cors_origin: None,
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base_url: "https://api.stripe.com".to_string(),
            default_currency: "usd".to_string(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_api_key: String::new(),
            twilio_api_secret: String::new(),
            twilio_phone_number: String::new(),
            twilio_video_base_url: "https://video.twilio.com".to_string(),
            twilio_messaging_base_url: "https://api.twilio.com".to_string(),
            sms_default_country_code: "+91".to_string(),
            email_api_url: String::new(),
            email_api_key: String::new(),
            email_from: "no-reply@telemedicine.local".to_string(),
            transition_policy: TransitionPolicy::Permissive,
        }
    }
}

fn var_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

fn var_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using default", name);
        default.to_string()
    })
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let jwt_expiry_hours = env::var("JWT_EXPIRE_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(24);

        let transition_policy = match env::var("APPOINTMENT_TRANSITION_POLICY").as_deref() {
            Ok("strict") => TransitionPolicy::Strict,
            Ok("permissive") | Err(_) => TransitionPolicy::Permissive,
            Ok(other) => {
                warn!("Unknown APPOINTMENT_TRANSITION_POLICY '{}', using permissive", other);
                TransitionPolicy::Permissive
            }
        };

        let config = Self {
            port,
            jwt_secret: var_or_empty("JWT_SECRET"),
            jwt_expiry_hours,
            cors_origin: env::var("CORS_ORIGIN").ok(),
            supabase_url: var_or_empty("SUPABASE_URL"),
            supabase_service_key: var_or_empty("SUPABASE_SERVICE_KEY"),
            stripe_secret_key: var_or_empty("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: var_or_empty("STRIPE_WEBHOOK_SECRET"),
            stripe_api_base_url: var_or_default("STRIPE_API_BASE_URL", "https://api.stripe.com"),
            default_currency: var_or_default("PAYMENT_CURRENCY", "usd"),
            twilio_account_sid: var_or_empty("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: var_or_empty("TWILIO_AUTH_TOKEN"),
            twilio_api_key: var_or_empty("TWILIO_API_KEY"),
            twilio_api_secret: var_or_empty("TWILIO_API_SECRET"),
            twilio_phone_number: var_or_empty("TWILIO_PHONE_NUMBER"),
            twilio_video_base_url: var_or_default("TWILIO_VIDEO_BASE_URL", "https://video.twilio.com"),
            twilio_messaging_base_url: var_or_default("TWILIO_MESSAGING_BASE_URL", "https://api.twilio.com"),
            sms_default_country_code: var_or_default("SMS_DEFAULT_COUNTRY_CODE", "+91"),
            email_api_url: var_or_empty("EMAIL_API_URL"),
            email_api_key: var_or_empty("EMAIL_API_KEY"),
            email_from: var_or_default("EMAIL_FROM", "no-reply@telemedicine.local"),
            transition_policy,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - JWT_SECRET is missing");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_database_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty()
    }

    pub fn is_webhook_configured(&self) -> bool {
        !self.stripe_webhook_secret.is_empty()
    }

    pub fn is_video_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_api_key.is_empty()
            && !self.twilio_api_secret.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_phone_number.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_api_url.is_empty() && !self.email_api_key.is_empty()
    }
}
