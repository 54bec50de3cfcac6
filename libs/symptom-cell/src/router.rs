use axum::{middleware, routing::post, Router};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at the API root: the three endpoints live under different prefixes.
pub fn symptom_routes(state: AppState) -> Router {
    let public_routes = Router::new().route("/ai/predict", post(handlers::predict_condition));

    let protected_routes = Router::new()
        .route("/symptom-checker/analyze", post(handlers::analyze_symptoms))
        .route("/symptoms/sms", post(handlers::send_symptom_sms))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
