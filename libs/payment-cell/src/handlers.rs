use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    CreateIntentRequest, CreatePaymentRequest, PaymentError, ProcessorRefundRequest, RefundRequest,
    StripeSignature,
};
use crate::services::PaymentService;

pub async fn record_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let payment = PaymentService::new(&state).record_payment(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Payment recorded successfully",
            "payment": payment
        })),
    ))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let payments = PaymentService::new(&state).list(&user).await?;
    Ok(Json(json!({ "payments": payments })))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let payment = PaymentService::new(&state).get(&user, payment_id).await?;
    Ok(Json(json!(payment)))
}

pub async fn refund_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<Value>, AppError> {
    let payment = PaymentService::new(&state)
        .refund_record(&user, payment_id, request)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Payment refunded successfully",
        "payment": payment
    })))
}

pub async fn create_intent(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<Value>, AppError> {
    let intent = PaymentService::new(&state)
        .create_intent(&user, request.appointment_id)
        .await?;
    Ok(Json(json!(intent)))
}

pub async fn processor_refund(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<Uuid>,
    body: Option<Json<ProcessorRefundRequest>>,
) -> Result<Json<Value>, AppError> {
    let amount = body.and_then(|Json(b)| b.amount);
    let payment = PaymentService::new(&state)
        .processor_refund(&user, payment_id, amount)
        .await?;
    Ok(Json(json!({
        "success": true,
        "payment": payment
    })))
}

pub async fn payment_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let status = PaymentService::new(&state).status(&user, payment_id).await?;
    Ok(Json(json!(status)))
}

/// Processor callback. Authenticated by signature, not by token.
pub async fn webhook(
    State(state): State<AppState>,
    signature: Option<TypedHeader<StripeSignature>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let TypedHeader(StripeSignature(signature)) = signature
        .ok_or_else(|| PaymentError::InvalidSignature("Missing Stripe-Signature header".to_string()))?;

    PaymentService::new(&state).handle_webhook(&body, &signature).await?;
    Ok(Json(json!({ "received": true })))
}
