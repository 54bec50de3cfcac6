use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateAlertRequest, UpdateEmergencyStatusRequest};
use crate::services::EmergencyService;

pub async fn create_alert(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let emergency = EmergencyService::new(&state).create_alert(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Emergency alert sent successfully",
            "emergency": emergency
        })),
    ))
}

pub async fn get_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(emergency_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let emergency = EmergencyService::new(&state).status(&user, emergency_id).await?;
    Ok(Json(json!(emergency)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(emergency_id): Path<Uuid>,
    Json(request): Json<UpdateEmergencyStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let emergency = EmergencyService::new(&state)
        .update_status(&user, emergency_id, request)
        .await?;
    Ok(Json(json!(emergency)))
}
