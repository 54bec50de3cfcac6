use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use doctor_cell::router::doctor_routes;
use shared_database::{AppState, AvailabilityRepository, DoctorRepository};
use shared_models::doctor::DoctorProfile;
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
        let app = doctor_routes(state.clone());
        Self { config, state, app }
    }

    async fn send(&self, user: Option<&TestUser>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-auth-token", user.token(&self.config));
        }
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
async fn add_sample_seeds_directory_once() {
    let h = Harness::new();
    let admin = TestUser::admin("admin@example.com");

    let (status, body) = h.send(Some(&admin), "POST", "/add-sample", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);

    h.send(Some(&admin), "POST", "/add-sample", None).await;
    let (_, body) = h.send(None, "GET", "/", None).await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (_, body) = h.send(None, "GET", "/?specialty=cardiology", None).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Sarah Johnson");

    let id: Uuid = list[0]["id"].as_str().unwrap().parse().unwrap();
    let monday = h.state.store.find_availability(id, 1).await.unwrap().unwrap();
    assert_eq!(monday.time_slots.len(), 3);
}

#[tokio::test]
async fn patients_cannot_seed() {
    let h = Harness::new();
    let patient = TestUser::patient("pat@example.com");

    let (status, _) = h.send(Some(&patient), "POST", "/add-sample", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let h = Harness::new();
    let (status, body) = h.send(None, "GET", &format!("/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Doctor not found");
}

#[tokio::test]
async fn doctor_sets_own_availability() {
    let h = Harness::new();
    let doctor = TestUser::doctor("doc@example.com");
    h.state
        .store
        .upsert_doctor(DoctorProfile::new(doctor.id, "Doc", "Cardiology"))
        .await
        .unwrap();

    let uri = format!("/{}/availability", doctor.id);
    let (status, body) = h
        .send(
            Some(&doctor),
            "PUT",
            &uri,
            Some(json!({
                "dayOfWeek": 1,
                "timeSlots": [{"start": "09:00", "end": "10:00"}],
                "breakTime": [{"start": "12:00", "end": "13:00"}]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availability"]["is_available"], true);

    let (status, body) = h.send(None, "GET", &format!("{}?day=1", uri), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time_slots"], json!([{"start": "09:00", "end": "10:00", "is_booked": false}]));

    let (_, body) = h.send(None, "GET", &format!("{}?day=2", uri), None).await;
    assert_eq!(body["time_slots"], json!([]));
}

#[tokio::test]
async fn other_doctors_cannot_edit_availability() {
    let h = Harness::new();
    let owner = TestUser::doctor("owner@example.com");
    let intruder = TestUser::doctor("intruder@example.com");
    h.state
        .store
        .upsert_doctor(DoctorProfile::new(owner.id, "Owner", "Neurology"))
        .await
        .unwrap();

    let (status, _) = h
        .send(
            Some(&intruder),
            "PUT",
            &format!("/{}/availability", owner.id),
            Some(json!({"day_of_week": 1, "time_slots": []})),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reversed_slot_is_a_validation_error() {
    let h = Harness::new();
    let doctor = TestUser::doctor("doc@example.com");
    h.state
        .store
        .upsert_doctor(DoctorProfile::new(doctor.id, "Doc", "Cardiology"))
        .await
        .unwrap();

    let (status, _) = h
        .send(
            Some(&doctor),
            "PUT",
            &format!("/{}/availability", doctor.id),
            Some(json!({"day_of_week": 1, "time_slots": [{"start": "11:00", "end": "10:00"}]})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn availability_write_needs_a_token() {
    let h = Harness::new();
    let (status, _) = h
        .send(
            None,
            "PUT",
            &format!("/{}/availability", Uuid::new_v4()),
            Some(json!({"day_of_week": 1, "time_slots": []})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
