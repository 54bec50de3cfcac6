use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn emergency_routes(state: AppState) -> Router {
    Router::new()
        .route("/alert", post(handlers::create_alert))
        .route(
            "/status/{emergency_id}",
            get(handlers::get_status).put(handlers::update_status),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
