use axum::{middleware, routing::get, Router};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn medical_record_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_records).post(handlers::create_record))
        .route(
            "/{record_id}",
            get(handlers::get_record).put(handlers::update_record),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
