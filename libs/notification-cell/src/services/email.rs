use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{EmailMessage, NotificationError};

/// Sends HTML mail through an HTTP relay (`EMAIL_API_URL`).
pub struct EmailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_email_configured() {
            return Err(NotificationError::NotConfigured("Email"));
        }

        Ok(Self {
            client: Client::new(),
            api_url: config.email_api_url.clone(),
            api_key: config.email_api_key.clone(),
            from: config.email_from.clone(),
        })
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), NotificationError> {
        debug!("Sending email '{}' to {}", subject, to);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&EmailMessage {
                from: &self.from,
                to,
                subject,
                html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mail relay rejected message: {} - {}", status, body);
            return Err(NotificationError::Provider(format!("HTTP {}: {}", status, body)));
        }

        info!("Email '{}' sent to {}", subject, to);
        Ok(())
    }
}
