use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn payment_routes(state: AppState) -> Router {
    let public_routes = Router::new().route("/webhook", post(handlers::webhook));

    let protected_routes = Router::new()
        .route("/", post(handlers::record_payment).get(handlers::list_payments))
        .route("/create-intent", post(handlers::create_intent))
        .route("/refund/{payment_id}", post(handlers::processor_refund))
        .route("/status/{payment_id}", get(handlers::payment_status))
        .route("/{payment_id}", get(handlers::get_payment))
        .route("/{payment_id}/refund", put(handlers::refund_payment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
