use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{PaymentError, PaymentIntent, Refund, StripeErrorBody};

/// Stripe-compatible REST client (form-encoded requests, JSON responses).
pub struct StripeClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(config: &AppConfig) -> Result<Self, PaymentError> {
        if !config.is_payment_configured() {
            return Err(PaymentError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.stripe_api_base_url.trim_end_matches('/').to_string(),
            secret_key: config.stripe_secret_key.clone(),
        })
    }

    /// `amount` is in minor units. `metadata` ends up as `metadata[key]` fields.
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &[(&str, String)],
    ) -> Result<PaymentIntent, PaymentError> {
        let mut form = vec![
            ("amount".to_string(), amount.to_string()),
            ("currency".to_string(), currency.to_string()),
        ];
        form.extend(
            metadata
                .iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value.clone())),
        );

        debug!("Creating payment intent for {} {}", amount, currency);
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let intent: PaymentIntent = parse(response).await?;
        info!("Created payment intent {}", intent.id);
        Ok(intent)
    }

    pub async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.base_url, intent_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        parse(response).await
    }

    pub async fn create_refund(&self, intent_id: &str, amount: Option<i64>) -> Result<Refund, PaymentError> {
        let mut form = vec![("payment_intent", intent_id.to_string())];
        if let Some(amount) = amount {
            form.push(("amount", amount.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/refunds", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let refund: Refund = parse(response).await?;
        info!("Refund {} created for {}", refund.id, intent_id);
        Ok(refund)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, PaymentError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or_else(|| body.clone());
        error!("Stripe returned {}: {}", status, body);
        return Err(PaymentError::Processor(message));
    }

    serde_json::from_str(&body)
        .map_err(|e| PaymentError::Processor(format!("Failed to parse processor response: {}", e)))
}
