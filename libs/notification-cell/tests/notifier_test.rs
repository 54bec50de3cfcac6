use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::models::NotificationError;
use notification_cell::router::notification_routes;
use notification_cell::{NotificationService, SmsClient};
use shared_config::AppConfig;
use shared_database::{AppState, DoctorRepository, NotificationRepository, UserRepository};
use shared_models::appointment::Appointment;
use shared_models::auth::Role;
use shared_models::doctor::DoctorProfile;
use shared_models::notification::{Notification, NotificationType};
use shared_models::user::UserAccount;
use shared_utils::test_utils::{TestConfig, TestUser};

fn email_config(server: &MockServer) -> AppConfig {
    AppConfig {
        email_api_url: format!("{}/send", server.uri()),
        email_api_key: "mail-key".to_string(),
        ..TestConfig::default().to_app_config()
    }
}

async fn seed_booking(state: &AppState) -> Appointment {
    let doctor = state
        .store
        .upsert_doctor(DoctorProfile::new(Uuid::new_v4(), "Sarah Johnson", "Cardiology"))
        .await
        .unwrap();

    let mut doctor_account = UserAccount::new("Sarah Johnson", "sarah@clinic.test", "x".into(), Role::Doctor);
    doctor_account.id = doctor.id;
    state.store.insert_user(doctor_account).await.unwrap();

    let patient = state
        .store
        .insert_user(UserAccount::new("Pat Doe", "pat@clinic.test", "x".into(), Role::Patient))
        .await
        .unwrap();

    Appointment::new(
        patient.id,
        &patient.name,
        Some(doctor.id),
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
        "09:00",
        "chest pain",
    )
}

#[tokio::test]
async fn new_appointment_notifies_and_emails_both_parties() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("authorization", "Bearer mail-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let state = AppState::in_memory(Arc::new(email_config(&server)));
    let appointment = seed_booking(&state).await;

    NotificationService::new(&state)
        .notify_new_appointment(&appointment)
        .await
        .unwrap();

    let doctor_inbox = state.store.list_notifications(appointment.doctor_id.unwrap()).await.unwrap();
    assert_eq!(doctor_inbox.len(), 1);
    assert_eq!(doctor_inbox[0].title, "New Appointment");
    assert_eq!(doctor_inbox[0].related_to, Some(appointment.id));

    let patient_inbox = state.store.list_notifications(appointment.patient_id).await.unwrap();
    assert_eq!(patient_inbox.len(), 1);
    assert!(patient_inbox[0].message.contains("Dr. Sarah Johnson"));
}

#[tokio::test]
async fn relay_failure_does_not_fail_notifications() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let state = AppState::in_memory(Arc::new(email_config(&server)));
    let appointment = seed_booking(&state).await;
    let service = NotificationService::new(&state);

    service.notify_new_appointment(&appointment).await.unwrap();
    assert_eq!(service.list_for(appointment.patient_id).await.unwrap().len(), 1);

    let err = service.send_email("pat@clinic.test", "Hi", "<p>Hi</p>").await.unwrap_err();
    assert_matches!(err, NotificationError::Provider(_));
}

#[tokio::test]
async fn email_without_relay_is_not_configured() {
    let state = TestConfig::default().to_state();
    let err = NotificationService::new(&state)
        .send_email("pat@clinic.test", "Hi", "<p>Hi</p>")
        .await
        .unwrap_err();
    assert_matches!(err, NotificationError::NotConfigured("Email"));
}

#[tokio::test]
async fn sms_posts_form_to_messages_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
        .and(body_string_contains("To=%2B919876543210"))
        .and(body_string_contains("From=%2B15550000000"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "sid": "SM1",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig {
        twilio_account_sid: "AC123".to_string(),
        twilio_auth_token: "token".to_string(),
        twilio_phone_number: "+15550000000".to_string(),
        twilio_messaging_base_url: server.uri(),
        ..AppConfig::default()
    };

    let sid = SmsClient::new(&config).unwrap().send_sms("9876543210", "hello").await.unwrap();
    assert_eq!(sid, "SM1");
}

#[tokio::test]
async fn sms_requires_credentials() {
    assert_matches!(
        SmsClient::new(&AppConfig::default()),
        Err(NotificationError::NotConfigured("SMS"))
    );
}

async fn call(app: axum::Router, method: &str, uri: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-auth-token", token)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn only_the_recipient_marks_read() {
    let config = TestConfig::default();
    let state = config.to_state();
    let owner = TestUser::patient("owner@example.com");
    let stranger = TestUser::patient("stranger@example.com");

    let saved = state
        .store
        .insert_notification(Notification::new(owner.id, NotificationType::System, "Welcome", "Hello"))
        .await
        .unwrap();
    let app = notification_routes(state.clone());

    let (status, body) = call(app.clone(), "GET", "/", &owner.token(&config)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 1);

    let uri = format!("/{}/read", saved.id);
    let (status, _) = call(app.clone(), "PUT", &uri, &stranger.token(&config)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(app.clone(), "PUT", &uri, &owner.token(&config)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["read"], true);

    let (_, body) = call(app, "GET", "/", &owner.token(&config)).await;
    assert_eq!(body["unread"], 0);
}

#[tokio::test]
async fn unknown_notification_is_not_found() {
    let config = TestConfig::default();
    let app = notification_routes(config.to_state());
    let user = TestUser::patient("p@example.com");

    let uri = format!("/{}/read", Uuid::new_v4());
    let (status, body) = call(app, "PUT", &uri, &user.token(&config)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn email_body_names_the_sender() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "from": "no-reply@telemedicine.local",
            "to": "pat@clinic.test"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let state = AppState::in_memory(Arc::new(email_config(&server)));
    NotificationService::new(&state)
        .send_email("pat@clinic.test", "Hi", "<p>Hi</p>")
        .await
        .unwrap();
}
