use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use shared_database::{
    AppointmentRepository, AvailabilityRepository, MemoryStore, PaymentRepository, StoreError,
    UserRepository,
};
use shared_models::appointment::{
    Appointment, AppointmentPaymentStatus, AppointmentStatus, ConsultationType,
};
use shared_models::auth::Role;
use shared_models::availability::{DoctorAvailability, TimeSlot};
use shared_models::payment::{Payment, PaymentStatus};
use shared_models::user::UserAccount;

fn appointment(patient_id: Uuid, doctor_id: Option<Uuid>, time: &str) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        patient_name: "Pat".to_string(),
        doctor_id,
        date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
        time: time.to_string(),
        slot_end: None,
        consultation_type: ConsultationType::Video,
        symptoms: "cough".to_string(),
        status: AppointmentStatus::Pending,
        payment_status: AppointmentPaymentStatus::Unpaid,
        fee: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let store = MemoryStore::new();
    store
        .insert_user(UserAccount::new("Ann", "ann@example.com", "h".into(), Role::Patient))
        .await
        .unwrap();

    let result = store
        .insert_user(UserAccount::new("Other Ann", "ANN@example.com", "h".into(), Role::Patient))
        .await;

    assert_matches!(result, Err(StoreError::Duplicate(_)));
}

#[tokio::test]
async fn availability_upsert_keeps_one_document_per_day() {
    let store = MemoryStore::new();
    let doctor_id = Uuid::new_v4();

    let first = store
        .upsert_availability(DoctorAvailability::new(doctor_id, 1, vec![TimeSlot::new("09:00", "10:00")]))
        .await
        .unwrap();
    let second = store
        .upsert_availability(DoctorAvailability::new(doctor_id, 1, vec![TimeSlot::new("14:00", "15:00")]))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let days = store.list_availability(doctor_id).await.unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].time_slots, vec![TimeSlot::new("14:00", "15:00")]);
}

#[tokio::test]
async fn concurrent_claims_of_one_slot_have_a_single_winner() {
    let store = Arc::new(MemoryStore::new());
    let doctor_id = Uuid::new_v4();
    store
        .upsert_availability(DoctorAvailability::new(doctor_id, 1, vec![TimeSlot::new("09:00", "10:00")]))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.claim_slot(doctor_id, 1, "09:00", "10:00").await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);

    assert!(store.release_slot(doctor_id, 1, "09:00", "10:00").await.unwrap());
    assert!(store.claim_slot(doctor_id, 1, "09:00", "10:00").await.unwrap());
}

#[tokio::test]
async fn unavailable_day_cannot_be_claimed() {
    let store = MemoryStore::new();
    let doctor_id = Uuid::new_v4();
    let mut day = DoctorAvailability::new(doctor_id, 2, vec![TimeSlot::new("09:00", "10:00")]);
    day.is_available = false;
    store.upsert_availability(day).await.unwrap();

    assert!(!store.claim_slot(doctor_id, 2, "09:00", "10:00").await.unwrap());
}

#[tokio::test]
async fn active_appointments_are_unique_per_patient_and_doctor_time() {
    let store = MemoryStore::new();
    let patient = Uuid::new_v4();
    let doctor = Uuid::new_v4();

    store.insert_appointment(appointment(patient, Some(doctor), "09:00")).await.unwrap();

    let same_patient = store.insert_appointment(appointment(patient, None, "09:00")).await;
    assert_matches!(same_patient, Err(StoreError::Duplicate(_)));

    let same_doctor = store
        .insert_appointment(appointment(Uuid::new_v4(), Some(doctor), "09:00"))
        .await;
    assert_matches!(same_doctor, Err(StoreError::Duplicate(_)));

    store.insert_appointment(appointment(patient, Some(doctor), "10:00")).await.unwrap();
}

#[tokio::test]
async fn cancelled_appointment_frees_its_time() {
    let store = MemoryStore::new();
    let patient = Uuid::new_v4();

    let mut first = store.insert_appointment(appointment(patient, None, "09:00")).await.unwrap();
    first.status = AppointmentStatus::Cancelled;
    store.update_appointment(first).await.unwrap();

    let found = store
        .find_active_for_patient(patient, NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(), "09:00")
        .await
        .unwrap();
    assert!(found.is_none());

    store.insert_appointment(appointment(patient, None, "09:00")).await.unwrap();
}

#[tokio::test]
async fn patient_listing_is_sorted_by_schedule() {
    let store = MemoryStore::new();
    let patient = Uuid::new_v4();

    store.insert_appointment(appointment(patient, None, "15:00")).await.unwrap();
    store.insert_appointment(appointment(patient, None, "08:30")).await.unwrap();

    let list = store.list_appointments_for_patient(patient).await.unwrap();
    let times: Vec<_> = list.iter().map(|a| a.time.as_str()).collect();
    assert_eq!(times, vec!["08:30", "15:00"]);
}

#[tokio::test]
async fn transaction_ids_are_unique() {
    let store = MemoryStore::new();
    let now = Utc::now();
    let payment = Payment {
        id: Uuid::new_v4(),
        appointment_id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: None,
        amount: 5000,
        currency: "usd".to_string(),
        status: PaymentStatus::Pending,
        payment_method: "card".to_string(),
        transaction_id: "pi_123".to_string(),
        refund_details: None,
        payment_date: now,
        created_at: now,
        updated_at: now,
    };

    store.insert_payment(payment.clone()).await.unwrap();
    let again = store.insert_payment(Payment { id: Uuid::new_v4(), ..payment }).await;

    assert_matches!(again, Err(StoreError::Duplicate(_)));
    assert!(store.find_payment_by_transaction("pi_123").await.unwrap().is_some());
}
