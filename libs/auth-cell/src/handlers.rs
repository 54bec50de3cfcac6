use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{LoginRequest, RegisterRequest};
use crate::services::auth::AuthService;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let session = AuthService::new(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(json!(session))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let session = AuthService::new(&state).login(request).await?;
    Ok(Json(json!(session)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let profile = AuthService::new(&state).current_user(user.id).await?;
    Ok(Json(json!(profile)))
}
