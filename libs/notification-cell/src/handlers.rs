use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::services::NotificationService;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let notifications = NotificationService::new(&state).list_for(user.id).await?;
    let unread = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(json!({
        "notifications": notifications,
        "unread": unread
    })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let notification = NotificationService::new(&state)
        .mark_read(&user, notification_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "notification": notification
    })))
}
