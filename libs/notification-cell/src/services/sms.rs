use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{NotificationError, SmsResponse};

/// Prefixes `default_code` to numbers given without an international `+`.
pub fn format_phone_number(phone: &str, default_code: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("{}{}", default_code, trimmed)
    }
}

/// Twilio-compatible Messages API client.
#[derive(Debug)]
pub struct SmsClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    default_country_code: String,
}

impl SmsClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_sms_configured() {
            return Err(NotificationError::NotConfigured("SMS"));
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.twilio_messaging_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from: config.twilio_phone_number.clone(),
            default_country_code: config.sms_default_country_code.clone(),
        })
    }

    /// Returns the provider's message sid.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<String, NotificationError> {
        if to.trim().is_empty() {
            return Err(NotificationError::Validation("Phone number is required".to_string()));
        }

        let to = format_phone_number(to, &self.default_country_code);
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        debug!("Sending SMS to {}", to);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to.as_str()), ("From", self.from.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!("SMS provider error: {} - {}", status, text);
            return Err(NotificationError::Provider(format!("HTTP {}: {}", status, text)));
        }

        let message: SmsResponse = serde_json::from_str(&text)
            .map_err(|e| NotificationError::Provider(format!("Failed to parse SMS response: {}", e)))?;

        info!("SMS {} queued ({:?})", message.sid, message.status);
        Ok(message.sid)
    }
}
