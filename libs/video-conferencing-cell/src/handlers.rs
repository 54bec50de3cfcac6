use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::TokenRequest;
use crate::services::VideoConsultationService;

pub async fn create_token(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Value>, AppError> {
    let session = VideoConsultationService::new(&state)
        .join(&user, request.appointment_id)
        .await?;
    Ok(Json(json!(session)))
}

pub async fn end_consultation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    VideoConsultationService::new(&state).end(&user, appointment_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Video consultation ended successfully"
    })))
}

pub async fn room_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let room = VideoConsultationService::new(&state)
        .room_status(&user, appointment_id)
        .await?;
    Ok(Json(json!({ "room": room })))
}

pub async fn appointment_details(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = VideoConsultationService::new(&state)
        .appointment_details(&user, appointment_id)
        .await?;
    Ok(Json(json!(appointment)))
}
