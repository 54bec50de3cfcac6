use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use assert_matches::assert_matches;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use emergency_cell::models::{CreateAlertRequest, EmergencyError};
use emergency_cell::router::emergency_routes;
use emergency_cell::EmergencyService;
use shared_database::AppState;
use shared_utils::test_utils::{TestConfig, TestUser};

struct Harness {
    config: TestConfig,
    state: AppState,
    app: Router,
}

impl Harness {
    fn new() -> Self {
        let config = TestConfig::default();
        let state = config.to_state();
        Self {
            app: emergency_routes(state.clone()),
            state,
            config,
        }
    }

    async fn send(&self, user: &TestUser, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-auth-token", user.token(&self.config));
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn alert_starts_active_and_owner_can_resolve_it() {
    let h = Harness::new();
    let user = TestUser::patient("pat@example.com");

    let (status, body) = h
        .send(
            &user,
            "POST",
            "/alert",
            Some(json!({ "location": "12 Main St", "description": "chest pain" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["emergency"]["status"], "active");
    let id = body["emergency"]["id"].as_str().unwrap().to_string();

    let (status, body) = h.send(&user, "GET", &format!("/status/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "12 Main St");

    let (status, body) = h
        .send(&user, "PUT", &format!("/status/{}", id), Some(json!({ "status": "in-progress" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in-progress");
}

#[tokio::test]
async fn alert_requires_location_and_description() {
    let h = Harness::new();
    let user = TestUser::patient("pat@example.com");

    let (status, body) = h
        .send(&user, "POST", "/alert", Some(json!({ "location": "  ", "description": "fall" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide location and description");

    let err = EmergencyService::new(&h.state)
        .create_alert(&user.to_user(), CreateAlertRequest::default())
        .await
        .unwrap_err();
    assert_matches!(err, EmergencyError::MissingDetails);
}

#[tokio::test]
async fn only_the_owner_sees_or_updates() {
    let h = Harness::new();
    let owner = TestUser::patient("pat@example.com");
    let other = TestUser::admin("admin@example.com");

    let (_, body) = h
        .send(&owner, "POST", "/alert", Some(json!({ "location": "home", "description": "fall" })))
        .await;
    let id = body["emergency"]["id"].as_str().unwrap().to_string();

    let (status, _) = h.send(&other, "GET", &format!("/status/{}", id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(&other, "PUT", &format!("/status/{}", id), Some(json!({ "status": "resolved" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h.send(&owner, "GET", &format!("/status/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_status_values_are_rejected() {
    let h = Harness::new();
    let owner = TestUser::patient("pat@example.com");

    let (_, body) = h
        .send(&owner, "POST", "/alert", Some(json!({ "location": "home", "description": "fall" })))
        .await;
    let uri = format!("/status/{}", body["emergency"]["id"].as_str().unwrap());

    let (status, body) = h.send(&owner, "PUT", &uri, Some(json!({ "status": "escalated" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid emergency status: escalated");

    let (status, body) = h.send(&owner, "PUT", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide status");
}
