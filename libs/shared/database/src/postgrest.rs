//! [`Store`](crate::store::Store) over Supabase's PostgREST API.
//!
//! Uniqueness rules (emails, active appointment keys, transaction ids) are
//! enforced by indexes in `supabase/schema.sql`; PostgREST reports them as 409.
//! Slot claims run inside the `claim_availability_slot` function so the check
//! and the update happen in one transaction.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::appointment::Appointment;
use shared_models::availability::DoctorAvailability;
use shared_models::doctor::DoctorProfile;
use shared_models::emergency::Emergency;
use shared_models::medical_record::{MedicalRecord, MedicalRecordFilter};
use shared_models::notification::Notification;
use shared_models::payment::Payment;
use shared_models::user::UserAccount;

use crate::store::{
    AppointmentRepository, AvailabilityRepository, DoctorRepository, EmergencyRepository,
    MedicalRecordRepository, NotificationRepository, PaymentRepository, StoreError, StoreResult,
    UserRepository,
};
use crate::supabase::{PostgrestError, SupabaseClient};

const RETURN_REPRESENTATION: &str = "return=representation";
const UPSERT: &str = "resolution=merge-duplicates,return=representation";

pub struct SupabaseStore {
    client: SupabaseClient,
}

fn map_error(err: anyhow::Error, what: &str) -> StoreError {
    match err.downcast_ref::<PostgrestError>() {
        Some(postgrest) if postgrest.status == 409 => StoreError::Duplicate(what.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}

fn to_body<T: Serialize>(row: &T) -> StoreResult<Value> {
    serde_json::to_value(row).map_err(|e| StoreError::Backend(e.to_string()))
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(SupabaseClient::new(config))
    }

    pub fn with_client(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &str) -> StoreResult<Vec<T>> {
        let path = format!("/rest/v1/{}?{}", table, query);
        self.client
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| map_error(e, table))
    }

    async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &str) -> StoreResult<Option<T>> {
        let rows: Vec<T> = self.select(table, query).await?;
        Ok(rows.into_iter().next())
    }

    async fn write<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        prefer: &str,
        body: Value,
        what: &str,
    ) -> StoreResult<Option<T>> {
        let rows: Vec<T> = self
            .client
            .request_with_prefer(method, path, Some(prefer), Some(body))
            .await
            .map_err(|e| map_error(e, what))?;
        Ok(rows.into_iter().next())
    }

    async fn insert<T>(&self, table: &str, row: &T, what: &str) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        self.write(Method::POST, &path, RETURN_REPRESENTATION, to_body(row)?, what)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("insert into {} returned no rows", table)))
    }

    async fn update<T>(&self, table: &str, id: Uuid, row: &T, what: &str) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?id=eq.{}", table, id);
        self.write(Method::PATCH, &path, RETURN_REPRESENTATION, to_body(row)?, what)
            .await?
            .ok_or_else(|| StoreError::NotFound(what.to_string()))
    }
}

#[async_trait]
impl UserRepository for SupabaseStore {
    async fn insert_user(&self, user: UserAccount) -> StoreResult<UserAccount> {
        self.insert("users", &user, "email").await
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        self.select_one("users", &format!("id=eq.{}", id)).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        self.select_one("users", &format!("email=eq.{}", urlencoding::encode(email)))
            .await
    }

    async fn update_user(&self, mut user: UserAccount) -> StoreResult<UserAccount> {
        user.updated_at = Utc::now();
        self.update("users", user.id, &user, "user").await
    }

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        self.select("users", "order=created_at.asc").await
    }
}

#[async_trait]
impl DoctorRepository for SupabaseStore {
    async fn list_doctors(&self) -> StoreResult<Vec<DoctorProfile>> {
        self.select("doctors", "order=name.asc").await
    }

    async fn find_doctor(&self, id: Uuid) -> StoreResult<Option<DoctorProfile>> {
        self.select_one("doctors", &format!("id=eq.{}", id)).await
    }

    async fn upsert_doctor(&self, doctor: DoctorProfile) -> StoreResult<DoctorProfile> {
        self.write(Method::POST, "/rest/v1/doctors?on_conflict=id", UPSERT, to_body(&doctor)?, "doctor")
            .await?
            .ok_or_else(|| StoreError::Backend("doctor upsert returned no rows".to_string()))
    }
}

#[async_trait]
impl AvailabilityRepository for SupabaseStore {
    async fn find_availability(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> StoreResult<Option<DoctorAvailability>> {
        let query = format!("doctor_id=eq.{}&day_of_week=eq.{}", doctor_id, day_of_week);
        self.select_one("doctor_availabilities", &query).await
    }

    async fn list_availability(&self, doctor_id: Uuid) -> StoreResult<Vec<DoctorAvailability>> {
        let query = format!("doctor_id=eq.{}&order=day_of_week.asc", doctor_id);
        self.select("doctor_availabilities", &query).await
    }

    async fn upsert_availability(
        &self,
        mut availability: DoctorAvailability,
    ) -> StoreResult<DoctorAvailability> {
        availability.updated_at = Utc::now();
        let mut body = to_body(&availability)?;
        // Let an existing row keep its id and created_at.
        if let Some(fields) = body.as_object_mut() {
            fields.remove("id");
            fields.remove("created_at");
        }
        self.write(
            Method::POST,
            "/rest/v1/doctor_availabilities?on_conflict=doctor_id,day_of_week",
            UPSERT,
            body,
            "availability",
        )
        .await?
        .ok_or_else(|| StoreError::Backend("availability upsert returned no rows".to_string()))
    }

    async fn claim_slot(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        start: &str,
        end: &str,
    ) -> StoreResult<bool> {
        let args = json!({
            "p_doctor_id": doctor_id,
            "p_day_of_week": day_of_week,
            "p_start": start,
            "p_end": end,
        });
        let claimed = self
            .client
            .rpc::<bool>("claim_availability_slot", args)
            .await
            .map_err(|e| map_error(e, "availability"))?;
        debug!("Claim {}-{} for doctor {} day {}: {}", start, end, doctor_id, day_of_week, claimed);
        Ok(claimed)
    }

    async fn release_slot(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        start: &str,
        end: &str,
    ) -> StoreResult<bool> {
        let args = json!({
            "p_doctor_id": doctor_id,
            "p_day_of_week": day_of_week,
            "p_start": start,
            "p_end": end,
        });
        self.client
            .rpc::<bool>("release_availability_slot", args)
            .await
            .map_err(|e| map_error(e, "availability"))
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseStore {
    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        self.insert("appointments", &appointment, "appointment time").await
    }

    async fn update_appointment(&self, mut appointment: Appointment) -> StoreResult<Appointment> {
        appointment.updated_at = Utc::now();
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment.id);
        self.write(Method::PATCH, &path, RETURN_REPRESENTATION, to_body(&appointment)?, "appointment time")
            .await?
            .ok_or_else(|| StoreError::NotFound("appointment".to_string()))
    }

    async fn find_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        self.select_one("appointments", &format!("id=eq.{}", id)).await
    }

    async fn list_appointments_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Appointment>> {
        let query = format!("patient_id=eq.{}&order=date.asc,time.asc", patient_id);
        self.select("appointments", &query).await
    }

    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> StoreResult<Vec<Appointment>> {
        let query = format!("doctor_id=eq.{}&order=date.asc,time.asc", doctor_id);
        self.select("appointments", &query).await
    }

    async fn find_active_for_patient(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> StoreResult<Option<Appointment>> {
        let query = format!(
            "patient_id=eq.{}&date=eq.{}&time=eq.{}&status=in.(pending,confirmed)",
            patient_id,
            date.format("%Y-%m-%d"),
            urlencoding::encode(time)
        );
        self.select_one("appointments", &query).await
    }
}

#[async_trait]
impl PaymentRepository for SupabaseStore {
    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment> {
        self.insert("payments", &payment, "transaction id").await
    }

    async fn find_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        self.select_one("payments", &format!("id=eq.{}", id)).await
    }

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>> {
        let query = format!("transaction_id=eq.{}", urlencoding::encode(transaction_id));
        self.select_one("payments", &query).await
    }

    async fn update_payment(&self, mut payment: Payment) -> StoreResult<Payment> {
        payment.updated_at = Utc::now();
        self.update("payments", payment.id, &payment, "payment").await
    }

    async fn list_payments_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Payment>> {
        let query = format!(
            "or=(patient_id.eq.{id},doctor_id.eq.{id})&order=created_at.desc",
            id = user_id
        );
        self.select("payments", &query).await
    }
}

#[async_trait]
impl EmergencyRepository for SupabaseStore {
    async fn insert_emergency(&self, emergency: Emergency) -> StoreResult<Emergency> {
        self.insert("emergencies", &emergency, "emergency").await
    }

    async fn find_emergency(&self, id: Uuid) -> StoreResult<Option<Emergency>> {
        self.select_one("emergencies", &format!("id=eq.{}", id)).await
    }

    async fn update_emergency(&self, mut emergency: Emergency) -> StoreResult<Emergency> {
        emergency.updated_at = Utc::now();
        self.update("emergencies", emergency.id, &emergency, "emergency").await
    }
}

#[async_trait]
impl MedicalRecordRepository for SupabaseStore {
    async fn insert_medical_record(&self, record: MedicalRecord) -> StoreResult<MedicalRecord> {
        self.insert("medical_records", &record, "medical record").await
    }

    async fn find_medical_record(&self, id: Uuid) -> StoreResult<Option<MedicalRecord>> {
        self.select_one("medical_records", &format!("id=eq.{}", id)).await
    }

    async fn update_medical_record(&self, mut record: MedicalRecord) -> StoreResult<MedicalRecord> {
        record.updated_at = Utc::now();
        self.update("medical_records", record.id, &record, "medical record").await
    }

    async fn list_medical_records(&self, filter: MedicalRecordFilter) -> StoreResult<Vec<MedicalRecord>> {
        let query = match filter {
            MedicalRecordFilter::All => "order=created_at.desc".to_string(),
            MedicalRecordFilter::Patient(id) => format!("patient_id=eq.{}&order=created_at.desc", id),
            MedicalRecordFilter::Doctor(id) => format!("doctor_id=eq.{}&order=created_at.desc", id),
        };
        self.select("medical_records", &query).await
    }
}

#[async_trait]
impl NotificationRepository for SupabaseStore {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification> {
        self.insert("notifications", &notification, "notification").await
    }

    async fn find_notification(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        self.select_one("notifications", &format!("id=eq.{}", id)).await
    }

    async fn update_notification(&self, notification: Notification) -> StoreResult<Notification> {
        self.update("notifications", notification.id, &notification, "notification").await
    }

    async fn list_notifications(&self, recipient_id: Uuid) -> StoreResult<Vec<Notification>> {
        let query = format!("recipient_id=eq.{}&order=created_at.desc", recipient_id);
        self.select("notifications", &query).await
    }
}
