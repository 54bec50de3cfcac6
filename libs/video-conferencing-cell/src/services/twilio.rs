use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{AccessTokenClaims, Grants, Room, VideoError, VideoGrant};

pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Twilio-compatible Video REST client.
pub struct TwilioVideoClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    api_key: String,
    api_secret: String,
}

impl TwilioVideoClient {
    pub fn new(config: &AppConfig) -> Result<Self, VideoError> {
        if !config.is_video_configured() {
            return Err(VideoError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.twilio_video_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            api_key: config.twilio_api_key.clone(),
            api_secret: config.twilio_api_secret.clone(),
        })
    }

    /// Access token granting `identity` entry to `room_name` for one hour.
    pub fn generate_token(&self, identity: &str, room_name: &str) -> Result<String, VideoError> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            jti: format!("{}-{}", self.api_key, now),
            iss: self.api_key.clone(),
            sub: self.account_sid.clone(),
            iat: now,
            exp: now + TOKEN_TTL_SECONDS,
            grants: Grants {
                identity: identity.to_string(),
                video: VideoGrant {
                    room: room_name.to_string(),
                },
            },
        };

        let mut header = Header::new(Algorithm::HS256);
        header.cty = Some("twilio-fpa;v=1".to_string());

        encode(&header, &claims, &EncodingKey::from_secret(self.api_secret.as_bytes()))
            .map_err(|e| VideoError::Token(e.to_string()))
    }

    pub async fn create_room(&self, room_name: &str) -> Result<Room, VideoError> {
        info!("Creating video room {}", room_name);
        let url = format!("{}/v1/Rooms", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("UniqueName", room_name),
                ("Type", "go"),
                ("RecordParticipantsOnConnect", "true"),
            ])
            .send()
            .await?;

        self.parse_room(response).await
    }

    pub async fn end_room(&self, room_name: &str) -> Result<Room, VideoError> {
        info!("Completing video room {}", room_name);
        let url = format!("{}/v1/Rooms/{}", self.base_url, room_name);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Status", "completed")])
            .send()
            .await?;

        self.parse_room(response).await
    }

    pub async fn get_room(&self, room_name: &str) -> Result<Room, VideoError> {
        debug!("Fetching video room {}", room_name);
        let url = format!("{}/v1/Rooms/{}", self.base_url, room_name);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;

        self.parse_room(response).await
    }

    async fn parse_room(&self, response: Response) -> Result<Room, VideoError> {
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(VideoError::RoomNotFound);
        }
        if !status.is_success() {
            error!("Video provider returned {}: {}", status, body);
            return Err(VideoError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| VideoError::Provider {
            status: status.as_u16(),
            message: format!("Failed to parse room: {}", e),
        })
    }
}
