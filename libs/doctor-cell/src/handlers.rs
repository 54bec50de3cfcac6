use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::access::{authorize, Action, Relation, Resource};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AvailabilityQuery, DoctorListQuery, SetAvailabilityRequest};
use crate::services::{AvailabilityService, DoctorService};

pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(state.store.clone())
        .list_doctors(query.specialty.as_deref())
        .await?;
    Ok(Json(json!(doctors)))
}

pub async fn get_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(state.store.clone()).get_doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

pub async fn add_sample_doctors(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, Resource::Doctor, Action::Create, Relation::Unrelated)?;
    let doctors = DoctorService::new(state.store.clone()).add_samples().await?;
    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(state.store.clone());

    match query.day {
        Some(day) => {
            let slots = service.get_availability(doctor_id, day).await?;
            Ok(Json(json!({
                "doctor_id": doctor_id,
                "day_of_week": day,
                "time_slots": slots
            })))
        }
        None => {
            let week = service.weekly_availability(doctor_id).await?;
            Ok(Json(json!(week)))
        }
    }
}

#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let saved = AvailabilityService::new(state.store.clone())
        .set_availability(&user, doctor_id, request)
        .await?;
    Ok(Json(json!({
        "success": true,
        "availability": saved
    })))
}
