use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use emergency_cell::router::emergency_routes;
use medical_records_cell::router::medical_record_routes;
use notification_cell::router::notification_routes;
use payment_cell::router::payment_routes;
use shared_database::AppState;
use signaling_cell::router::signaling_routes;
use signaling_cell::RoomRegistry;
use symptom_cell::router::symptom_routes;
use user_cell::router::user_routes;
use video_conferencing_cell::router::video_routes;

pub fn create_router(state: AppState, registry: RoomRegistry) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/video", video_routes(state.clone()))
        .nest("/payments", payment_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/emergency", emergency_routes(state.clone()))
        .nest("/medical-records", medical_record_routes(state.clone()))
        .merge(symptom_routes(state))
        .merge(signaling_routes(registry));

    Router::new()
        .route("/", get(|| async { "Telemedicine API is running!" }))
        .nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use shared_utils::test_utils::{TestConfig, TestUser};

    fn app() -> Router {
        create_router(TestConfig::default().to_state(), RoomRegistry::new())
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn root_answers() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn cells_are_mounted_under_api() {
        let token = TestUser::patient("pat@example.com").token(&TestConfig::default());
        for uri in ["/api/appointments", "/api/notifications", "/api/payments", "/api/medical-records", "/api/doctors"] {
            let request = Request::builder()
                .uri(uri)
                .header("x-auth-token", token.as_str())
                .body(Body::empty())
                .unwrap();
            assert_eq!(status_of(request).await, StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_calls() {
        let request = Request::builder()
            .uri("/api/appointments")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signaling_socket_lives_under_api() {
        let request = Request::builder().uri("/api/ws").body(Body::empty()).unwrap();
        let status = status_of(request).await;
        assert_ne!(status, StatusCode::NOT_FOUND);
    }
}
