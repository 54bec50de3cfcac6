use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn video_routes(state: AppState) -> Router {
    Router::new()
        .route("/token", post(handlers::create_token))
        .route("/end/{appointment_id}", post(handlers::end_consultation))
        .route("/status/{appointment_id}", get(handlers::room_status))
        .route("/appointment/{appointment_id}", get(handlers::appointment_details))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
