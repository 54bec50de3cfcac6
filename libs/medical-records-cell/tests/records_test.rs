use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use medical_records_cell::router::medical_record_routes;
use shared_utils::test_utils::{TestConfig, TestUser};

struct Harness {
    config: TestConfig,
    app: Router,
    doctor: TestUser,
    patient: TestUser,
}

impl Harness {
    fn new() -> Self {
        let config = TestConfig::default();
        Self {
            app: medical_record_routes(config.to_state()),
            config,
            doctor: TestUser::doctor("doc@example.com"),
            patient: TestUser::patient("pat@example.com"),
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

    async fn create(&self) -> Value {
        let (status, body) = self
            .send(
                &self.doctor,
                "POST",
                "/",
                Some(json!({
                    "patient": self.patient.id,
                    "diagnosis": "Seasonal flu",
                    "prescription": [
                        { "medicine": "Paracetamol", "dosage": "500mg", "duration": "5 days" }
                    ],
                    "vitals": { "temperature": 38.4 },
                    "followUpDate": "2030-02-01"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}

#[tokio::test]
async fn doctor_creates_and_both_parties_can_read() {
    let h = Harness::new();
    let record = h.create().await;
    assert_eq!(record["doctor_id"], h.doctor.id.to_string());
    assert_eq!(record["vitals"]["temperature"], 38.4);

    let uri = format!("/{}", record["id"].as_str().unwrap());
    let (status, body) = h.send(&h.patient, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "Seasonal flu");

    let stranger = TestUser::patient("other@example.com");
    let (status, _) = h.send(&stranger, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patients_cannot_author_records() {
    let h = Harness::new();
    let (status, _) = h
        .send(
            &h.patient,
            "POST",
            "/",
            Some(json!({ "patient": h.patient.id, "diagnosis": "self", "prescription": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn prescription_entries_need_every_field() {
    let h = Harness::new();
    let (status, body) = h
        .send(
            &h.doctor,
            "POST",
            "/",
            Some(json!({
                "patient": h.patient.id,
                "diagnosis": "Flu",
                "prescription": [{ "medicine": "Paracetamol", "duration": "5 days" }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Dosage is required");

    let (status, body) = h
        .send(&h.doctor, "POST", "/", Some(json!({ "patient": h.patient.id, "prescription": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Diagnosis is required");
}

#[tokio::test]
async fn listing_depends_on_role() {
    let h = Harness::new();
    h.create().await;
    h.create().await;

    let (_, mine) = h.send(&h.patient, "GET", "/", None).await;
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (_, authored) = h.send(&h.doctor, "GET", "/", None).await;
    assert_eq!(authored.as_array().unwrap().len(), 2);

    let other_doctor = TestUser::doctor("other-doc@example.com");
    let (_, none) = h.send(&other_doctor, "GET", "/", None).await;
    assert!(none.as_array().unwrap().is_empty());

    let admin = TestUser::admin("admin@example.com");
    let (_, all) = h.send(&admin, "GET", "/", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn only_the_author_updates_and_absent_fields_survive() {
    let h = Harness::new();
    let record = h.create().await;
    let uri = format!("/{}", record["id"].as_str().unwrap());

    let (status, _) = h
        .send(&h.patient, "PUT", &uri, Some(json!({ "diagnosis": "Nothing" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .send(&h.doctor, "PUT", &uri, Some(json!({ "notes": "Recovering well" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "Recovering well");
    assert_eq!(body["diagnosis"], "Seasonal flu");
    assert_eq!(body["prescription"][0]["medicine"], "Paracetamol");

    let (status, _) = h
        .send(&h.doctor, "PUT", &format!("/{}", Uuid::new_v4()), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
