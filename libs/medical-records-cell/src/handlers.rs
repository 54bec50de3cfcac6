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

use crate::models::{CreateMedicalRecordRequest, UpdateMedicalRecordRequest};
use crate::services::MedicalRecordService;

pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let record = MedicalRecordService::new(&state).create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(json!(record))))
}

pub async fn list_records(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let records = MedicalRecordService::new(&state).list(&user).await?;
    Ok(Json(json!(records)))
}

pub async fn get_record(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let record = MedicalRecordService::new(&state).get(&user, record_id).await?;
    Ok(Json(json!(record)))
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(record_id): Path<Uuid>,
    Json(request): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let record = MedicalRecordService::new(&state)
        .update(&user, record_id, request)
        .await?;
    Ok(Json(json!(record)))
}
