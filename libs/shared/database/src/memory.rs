use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

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

/// Process-local store. One lock per collection; every method takes its lock
/// once and never awaits anything else while holding it.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserAccount>>,
    doctors: RwLock<HashMap<Uuid, DoctorProfile>>,
    availability: RwLock<HashMap<(Uuid, u8), DoctorAvailability>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    payments: RwLock<HashMap<Uuid, Payment>>,
    emergencies: RwLock<HashMap<Uuid, Emergency>>,
    medical_records: RwLock<HashMap<Uuid, MedicalRecord>>,
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_schedule(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: UserAccount) -> StoreResult<UserAccount> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, mut user: UserAccount) -> StoreResult<UserAccount> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound("user".to_string()));
        }
        if users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }
        user.updated_at = Utc::now();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserAccount>> {
        let mut users: Vec<_> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }
}

#[async_trait]
impl DoctorRepository for MemoryStore {
    async fn list_doctors(&self) -> StoreResult<Vec<DoctorProfile>> {
        let mut doctors: Vec<_> = self.doctors.read().await.values().cloned().collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    async fn find_doctor(&self, id: Uuid) -> StoreResult<Option<DoctorProfile>> {
        Ok(self.doctors.read().await.get(&id).cloned())
    }

    async fn upsert_doctor(&self, doctor: DoctorProfile) -> StoreResult<DoctorProfile> {
        self.doctors.write().await.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }
}

#[async_trait]
impl AvailabilityRepository for MemoryStore {
    async fn find_availability(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> StoreResult<Option<DoctorAvailability>> {
        Ok(self.availability.read().await.get(&(doctor_id, day_of_week)).cloned())
    }

    async fn list_availability(&self, doctor_id: Uuid) -> StoreResult<Vec<DoctorAvailability>> {
        let mut days: Vec<_> = self
            .availability
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        days.sort_by_key(|a| a.day_of_week);
        Ok(days)
    }

    async fn upsert_availability(
        &self,
        mut availability: DoctorAvailability,
    ) -> StoreResult<DoctorAvailability> {
        let mut all = self.availability.write().await;
        let key = (availability.doctor_id, availability.day_of_week);
        if let Some(existing) = all.get(&key) {
            availability.id = existing.id;
            availability.created_at = existing.created_at;
        }
        availability.updated_at = Utc::now();
        all.insert(key, availability.clone());
        Ok(availability)
    }

    async fn claim_slot(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        start: &str,
        end: &str,
    ) -> StoreResult<bool> {
        let mut all = self.availability.write().await;
        let claimed = match all.get_mut(&(doctor_id, day_of_week)) {
            Some(day) if day.is_available => day.book_time_slot(start, end),
            _ => false,
        };
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
        let mut all = self.availability.write().await;
        Ok(all
            .get_mut(&(doctor_id, day_of_week))
            .map(|day| day.release_time_slot(start, end))
            .unwrap_or(false))
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn insert_appointment(&self, appointment: Appointment) -> StoreResult<Appointment> {
        let mut all = self.appointments.write().await;
        if all.values().any(|existing| existing.clashes_with(&appointment)) {
            return Err(StoreError::Duplicate("appointment time".to_string()));
        }
        all.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(&self, mut appointment: Appointment) -> StoreResult<Appointment> {
        let mut all = self.appointments.write().await;
        if !all.contains_key(&appointment.id) {
            return Err(StoreError::NotFound("appointment".to_string()));
        }
        if all.values().any(|existing| existing.clashes_with(&appointment)) {
            return Err(StoreError::Duplicate("appointment time".to_string()));
        }
        appointment.updated_at = Utc::now();
        all.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn list_appointments_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Appointment>> {
        let mut list: Vec<_> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        sort_by_schedule(&mut list);
        Ok(list)
    }

    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> StoreResult<Vec<Appointment>> {
        let mut list: Vec<_> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == Some(doctor_id))
            .cloned()
            .collect();
        sort_by_schedule(&mut list);
        Ok(list)
    }

    async fn find_active_for_patient(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> StoreResult<Option<Appointment>> {
        let all = self.appointments.read().await;
        Ok(all
            .values()
            .find(|a| {
                a.patient_id == patient_id && a.date == date && a.time == time && a.status.is_active()
            })
            .cloned())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment> {
        let mut all = self.payments.write().await;
        if all.values().any(|p| p.transaction_id == payment.transaction_id) {
            return Err(StoreError::Duplicate("transaction id".to_string()));
        }
        all.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_payment(&self, id: Uuid) -> StoreResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> StoreResult<Option<Payment>> {
        let all = self.payments.read().await;
        Ok(all.values().find(|p| p.transaction_id == transaction_id).cloned())
    }

    async fn update_payment(&self, mut payment: Payment) -> StoreResult<Payment> {
        let mut all = self.payments.write().await;
        if !all.contains_key(&payment.id) {
            return Err(StoreError::NotFound("payment".to_string()));
        }
        payment.updated_at = Utc::now();
        all.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn list_payments_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Payment>> {
        let mut list: Vec<_> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.patient_id == user_id || p.doctor_id == Some(user_id))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

#[async_trait]
impl EmergencyRepository for MemoryStore {
    async fn insert_emergency(&self, emergency: Emergency) -> StoreResult<Emergency> {
        self.emergencies.write().await.insert(emergency.id, emergency.clone());
        Ok(emergency)
    }

    async fn find_emergency(&self, id: Uuid) -> StoreResult<Option<Emergency>> {
        Ok(self.emergencies.read().await.get(&id).cloned())
    }

    async fn update_emergency(&self, mut emergency: Emergency) -> StoreResult<Emergency> {
        let mut all = self.emergencies.write().await;
        if !all.contains_key(&emergency.id) {
            return Err(StoreError::NotFound("emergency".to_string()));
        }
        emergency.updated_at = Utc::now();
        all.insert(emergency.id, emergency.clone());
        Ok(emergency)
    }
}

#[async_trait]
impl MedicalRecordRepository for MemoryStore {
    async fn insert_medical_record(&self, record: MedicalRecord) -> StoreResult<MedicalRecord> {
        self.medical_records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_medical_record(&self, id: Uuid) -> StoreResult<Option<MedicalRecord>> {
        Ok(self.medical_records.read().await.get(&id).cloned())
    }

    async fn update_medical_record(&self, mut record: MedicalRecord) -> StoreResult<MedicalRecord> {
        let mut all = self.medical_records.write().await;
        if !all.contains_key(&record.id) {
            return Err(StoreError::NotFound("medical record".to_string()));
        }
        record.updated_at = Utc::now();
        all.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_medical_records(&self, filter: MedicalRecordFilter) -> StoreResult<Vec<MedicalRecord>> {
        let mut list: Vec<_> = self
            .medical_records
            .read()
            .await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_notification(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        Ok(self.notifications.read().await.get(&id).cloned())
    }

    async fn update_notification(&self, notification: Notification) -> StoreResult<Notification> {
        let mut all = self.notifications.write().await;
        if !all.contains_key(&notification.id) {
            return Err(StoreError::NotFound("notification".to_string()));
        }
        all.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_notifications(&self, recipient_id: Uuid) -> StoreResult<Vec<Notification>> {
        let mut list: Vec<_> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }
}
