use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use notification_cell::SmsClient;
use shared_database::AppState;

use crate::models::{AnalyzeRequest, PredictRequest, SymptomError, SymptomSmsRequest};
use crate::services::{analyze, predict};

pub async fn analyze_symptoms(Json(request): Json<AnalyzeRequest>) -> Result<Json<Value>, SymptomError> {
    let text = request.symptoms.ok_or(SymptomError::MissingSymptoms)?;
    let analysis = analyze(&text)?;
    Ok(Json(json!(analysis)))
}

pub async fn predict_condition(Json(request): Json<PredictRequest>) -> Result<Json<Value>, SymptomError> {
    let result = predict(&request.symptoms)?;
    Ok(Json(json!({ "result": result })))
}

pub async fn send_symptom_sms(
    State(state): State<AppState>,
    Json(request): Json<SymptomSmsRequest>,
) -> Result<Json<Value>, SymptomError> {
    let phone = request
        .phone
        .filter(|p| !p.trim().is_empty())
        .ok_or(SymptomError::MissingPhone)?;
    if request.symptoms.is_empty() {
        return Err(SymptomError::MissingSymptoms);
    }

    let body = format!(
        "Your reported symptoms: {}. A doctor will contact you shortly. Please stay hydrated and rest.",
        request.symptoms.join(", ")
    );
    let sid = SmsClient::new(&state.config)?.send_sms(&phone, &body).await?;
    info!("Symptom follow-up SMS {} sent", sid);

    Ok(Json(json!({
        "success": true,
        "message": "SMS sent successfully. A doctor will contact you shortly."
    })))
}
