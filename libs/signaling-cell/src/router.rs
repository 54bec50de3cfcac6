use axum::{routing::get, Router};

use crate::handlers;
use crate::services::RoomRegistry;

pub fn signaling_routes(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/ws", get(handlers::ws_upgrade))
        .with_state(registry)
}
