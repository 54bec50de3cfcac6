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

use crate::models::{BookAppointmentRequest, UpdateStatusRequest};
use crate::services::BookingService;

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let appointments = BookingService::new(&state).list_appointments(&user).await?;
    Ok(Json(json!(appointments)))
}

pub async fn available_slots(
    State(state): State<AppState>,
    Path((doctor_id, date)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let slots = BookingService::new(&state).available_slots(doctor_id, &date).await?;
    Ok(Json(json!(slots)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = BookingService::new(&state).book(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appointment booked successfully",
            "appointment": {
                "id": appointment.id,
                "date": appointment.date,
                "time": appointment.time,
                "status": appointment.status
            }
        })),
    ))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = BookingService::new(&state)
        .get_appointment(&user, appointment_id)
        .await?;
    Ok(Json(json!(appointment)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = BookingService::new(&state)
        .update_status(&user, appointment_id, &request.status)
        .await?;
    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    BookingService::new(&state).cancel(&user, appointment_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully"
    })))
}
