use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::jwt::validate_token;

pub const TOKEN_HEADER: &str = "x-auth-token";

/// Reads the session token from `x-auth-token`, falling back to `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap) -> Result<&str, AppError> {
    if let Some(value) = headers.get(TOKEN_HEADER) {
        return value
            .to_str()
            .map_err(|_| AppError::Auth("Invalid token header format".to_string()));
    }

    let auth_value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("No authentication token, access denied".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_headers(request.headers())?;

    let user = validate_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}
