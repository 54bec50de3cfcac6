use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{ChangePasswordRequest, MedicalHistoryRequest, UpdateProfileRequest, UpdateUserRequest};
use crate::services::profile::UserService;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let profile = UserService::new(state.store.clone()).get_profile(user.id).await?;
    Ok(Json(json!(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = UserService::new(state.store.clone())
        .update_profile(user.id, request)
        .await?;
    Ok(Json(json!(profile)))
}

pub async fn update_medical_history(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<MedicalHistoryRequest>,
) -> Result<Json<Value>, AppError> {
    let profile = UserService::new(state.store.clone())
        .replace_medical_history(user.id, request.medical_history)
        .await?;
    Ok(Json(json!(profile)))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    UserService::new(state.store.clone())
        .change_password(user.id, request)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Password updated successfully"
    })))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let users = UserService::new(state.store.clone()).list_users(&user).await?;
    Ok(Json(json!(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let found = UserService::new(state.store.clone()).get_user(&user, id).await?;
    Ok(Json(json!(found)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    let updated = UserService::new(state.store.clone())
        .update_user(&user, id, request)
        .await?;
    Ok(Json(json!(updated)))
}
