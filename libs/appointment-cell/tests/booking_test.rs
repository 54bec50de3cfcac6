use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::models::{BookAppointmentRequest, BookingError};
use appointment_cell::router::appointment_routes;
use appointment_cell::BookingService;
use shared_config::AppConfig;
use shared_database::{AppState, AvailabilityRepository, DoctorRepository};
use shared_models::appointment::TransitionPolicy;
use shared_models::availability::{DoctorAvailability, TimeSlot};
use shared_models::doctor::DoctorProfile;
use shared_utils::test_utils::{TestConfig, TestUser};

fn next_monday() -> NaiveDate {
    let mut day = Utc::now().date_naive() + Duration::days(1);
    while day.weekday() != Weekday::Mon {
        day += Duration::days(1);
    }
    day
}

struct Harness {
    config: TestConfig,
    state: AppState,
    app: Router,
    doctor: TestUser,
}

impl Harness {
    async fn new() -> Self {
        Self::with_state(TestConfig::default(), None).await
    }

    async fn with_state(config: TestConfig, state: Option<AppState>) -> Self {
        let state = state.unwrap_or_else(|| config.to_state());
        let doctor = TestUser::doctor("dr.a@example.com");

        state
            .store
            .upsert_doctor(DoctorProfile::new(doctor.id, "A", "General Practice"))
            .await
            .unwrap();
        state
            .store
            .upsert_availability(DoctorAvailability::new(
                doctor.id,
                1,
                vec![TimeSlot::new("09:00", "10:00")],
            ))
            .await
            .unwrap();

        let app = appointment_routes(state.clone());
        Self { config, state, app, doctor }
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

    fn booking(&self, date: NaiveDate, time: &str) -> Value {
        json!({
            "name": "Pat Doe",
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time,
            "symptoms": "headache",
            "doctorId": self.doctor.id,
            "consultationType": "video"
        })
    }

    async fn book_monday(&self, patient: &TestUser) -> Uuid {
        let (status, body) = self
            .send(patient, "POST", "/", Some(self.booking(next_monday(), "09:00")))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["appointment"]["id"].as_str().unwrap().parse().unwrap()
    }
}

#[tokio::test]
async fn monday_slot_disappears_once_booked() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");
    let uri = format!("/availability/{}/{}", h.doctor.id, next_monday().format("%Y-%m-%d"));

    let (status, body) = h.send(&patient, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "start": "09:00", "end": "10:00" }]));

    let (status, body) = h
        .send(&patient, "POST", "/", Some(h.booking(next_monday(), "09:00")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Appointment booked successfully");
    assert_eq!(body["appointment"]["status"], "pending");
    assert_eq!(body["appointment"]["time"], "09:00");

    let (_, body) = h.send(&patient, "GET", &uri, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_availability_date_is_rejected() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");

    let uri = format!("/availability/{}/next-monday", h.doctor.id);
    let (status, body) = h.send(&patient, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn yesterday_cannot_be_booked() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");
    let yesterday = Utc::now().date_naive() - Duration::days(1);

    let (status, body) = h
        .send(&patient, "POST", "/", Some(h.booking(yesterday, "09:00")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot book appointment for past dates");
}

#[tokio::test]
async fn missing_fields_are_reported_once() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");

    let (status, body) = h
        .send(&patient, "POST", "/", Some(json!({ "date": "2099-01-01", "time": "09:00" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please fill in all required fields");
}

#[tokio::test]
async fn same_patient_cannot_double_book() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");
    let request = json!({
        "name": "Pat Doe",
        "date": "2099-03-02",
        "time": "11:30",
        "symptoms": "fever"
    });

    let (status, _) = h.send(&patient, "POST", "/", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = h.send(&patient, "POST", "/", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You already have an appointment at this time");
}

#[tokio::test]
async fn time_outside_any_slot_is_a_conflict() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");

    let (status, body) = h
        .send(&patient, "POST", "/", Some(h.booking(next_monday(), "15:00")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Selected time slot is not available");
}

#[tokio::test]
async fn concurrent_bookings_claim_the_slot_once() {
    let h = Harness::new().await;
    let service = Arc::new(BookingService::new(&h.state));
    let doctor_id = h.doctor.id;

    let attempts = (0..8).map(|i| {
        let service = service.clone();
        async move {
            let patient = TestUser::patient(&format!("p{}@example.com", i)).to_user();
            let request = BookAppointmentRequest {
                name: Some(format!("Patient {}", i)),
                date: Some(next_monday().format("%Y-%m-%d").to_string()),
                time: Some("09:00".into()),
                symptoms: Some("cough".into()),
                doctor_id: Some(doctor_id),
                ..Default::default()
            };
            service.book(&patient, request).await
        }
    });
    let results = futures::future::join_all(attempts).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for failure in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_matches!(failure, BookingError::SlotUnavailable | BookingError::AlreadyBooked);
    }
}

#[tokio::test]
async fn doctor_lists_and_confirms_but_stranger_cannot() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");
    let stranger = TestUser::doctor("other@example.com");
    let id = h.book_monday(&patient).await;

    let (_, list) = h.send(&h.doctor, "GET", "/", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, list) = h.send(&stranger, "GET", "/", None).await;
    assert_eq!(list, json!([]));

    let uri = format!("/{}/status", id);
    let (status, _) = h
        .send(&stranger, "PATCH", &uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(&h.doctor, "PATCH", &uri, Some(json!({ "status": "no-show" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .send(&h.doctor, "PATCH", &uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "confirmed");

    let (status, _) = h.send(&stranger, "GET", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cancelling_frees_the_slot_but_completed_stays() {
    let h = Harness::new().await;
    let patient = TestUser::patient("pat@example.com");
    let id = h.book_monday(&patient).await;
    let slots_uri = format!("/availability/{}/{}", h.doctor.id, next_monday().format("%Y-%m-%d"));

    let (status, _) = h.send(&h.doctor, "PUT", &format!("/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h.send(&patient, "PUT", &format!("/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment cancelled successfully");

    let (_, body) = h.send(&patient, "GET", &slots_uri, None).await;
    assert_eq!(body, json!([{ "start": "09:00", "end": "10:00" }]));

    let id = h.book_monday(&patient).await;
    let (status, _) = h
        .send(&h.doctor, "PATCH", &format!("/{}/status", id), Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h.send(&patient, "PUT", &format!("/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot cancel a completed appointment");
}

#[tokio::test]
async fn reopening_a_cancelled_appointment_reclaims_the_slot() {
    let h = Harness::new().await;
    let first = TestUser::patient("first@example.com");
    let second = TestUser::patient("second@example.com");
    let third = TestUser::patient("third@example.com");

    let reopened = h.book_monday(&first).await;
    let (status, _) = h.send(&first, "PUT", &format!("/{}/cancel", reopened), None).await;
    assert_eq!(status, StatusCode::OK);

    let taken = h.book_monday(&second).await;
    let uri = format!("/{}/status", reopened);
    let (status, body) = h
        .send(&h.doctor, "PATCH", &uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Selected time slot is not available");
    let (_, body) = h.send(&first, "GET", &format!("/{}", reopened), None).await;
    assert_eq!(body["status"], "cancelled");

    let (status, _) = h.send(&second, "PUT", &format!("/{}/cancel", taken), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h
        .send(&h.doctor, "PATCH", &uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut late = h.booking(next_monday(), "09:30");
    late["endTime"] = json!("10:00");
    let (status, _) = h.send(&third, "POST", "/", Some(late)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = h.send(&h.doctor, "GET", "/", None).await;
    let active = list
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["status"] == "pending" || a["status"] == "confirmed")
        .count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn strict_policy_blocks_skipping_confirmation() {
    let config = TestConfig::default();
    let strict = AppConfig {
        transition_policy: TransitionPolicy::Strict,
        ..config.to_app_config()
    };
    let state = AppState::in_memory(Arc::new(strict));
    let h = Harness::with_state(config, Some(state)).await;
    let patient = TestUser::patient("pat@example.com");
    let id = h.book_monday(&patient).await;

    let uri = format!("/{}/status", id);
    let (status, body) = h
        .send(&h.doctor, "PATCH", &uri, Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change appointment status from pending to completed");

    let (status, _) = h
        .send(&h.doctor, "PATCH", &uri, Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
    let h = Harness::new().await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
