use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared_database::{AppState, MedicalRecordRepository, Store};
use shared_models::access::{authorize, Action, Relation, Resource};
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::medical_record::{MedicalRecord, MedicalRecordFilter};

use crate::models::{prescriptions, CreateMedicalRecordRequest, MedicalRecordError, UpdateMedicalRecordRequest};

pub struct MedicalRecordService {
    store: Arc<dyn Store>,
}

impl MedicalRecordService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Records authored by the calling doctor.
    pub async fn create(&self, caller: &User, request: CreateMedicalRecordRequest) -> Result<MedicalRecord, AppError> {
        authorize(caller, Resource::MedicalRecord, Action::Create, Relation::Unrelated)?;

        let patient_id = request
            .patient
            .ok_or_else(|| MedicalRecordError::Validation("Patient ID is required".to_string()))?;
        let diagnosis = request
            .diagnosis
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| MedicalRecordError::Validation("Diagnosis is required".to_string()))?;
        let prescription = request
            .prescription
            .ok_or_else(|| MedicalRecordError::Validation("Prescription is required".to_string()))?;

        let now = Utc::now();
        let record = MedicalRecord {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: caller.id,
            appointment_id: request.appointment,
            diagnosis,
            prescription: prescriptions(prescription)?,
            lab_reports: request.lab_reports,
            vitals: request.vitals,
            notes: request.notes,
            follow_up_date: request.follow_up_date,
            attachments: request.attachments.into_iter().map(Into::into).collect(),
            created_at: now,
            updated_at: now,
        };

        let saved = self
            .store
            .insert_medical_record(record)
            .await
            .map_err(MedicalRecordError::from)?;
        info!("Medical record {} created by {} for {}", saved.id, caller.id, saved.patient_id);
        Ok(saved)
    }

    /// Patients see their own records, doctors the ones they wrote, admins everything.
    pub async fn list(&self, caller: &User) -> Result<Vec<MedicalRecord>, AppError> {
        authorize(caller, Resource::MedicalRecord, Action::List, Relation::Unrelated)?;

        let filter = match caller.role {
            Role::Patient => MedicalRecordFilter::Patient(caller.id),
            Role::Doctor => MedicalRecordFilter::Doctor(caller.id),
            Role::Admin => MedicalRecordFilter::All,
        };
        Ok(self
            .store
            .list_medical_records(filter)
            .await
            .map_err(MedicalRecordError::from)?)
    }

    async fn record(&self, id: Uuid) -> Result<MedicalRecord, MedicalRecordError> {
        self.store
            .find_medical_record(id)
            .await?
            .ok_or(MedicalRecordError::NotFound)
    }

    pub async fn get(&self, caller: &User, id: Uuid) -> Result<MedicalRecord, AppError> {
        let record = self.record(id).await?;
        authorize(caller, Resource::MedicalRecord, Action::Read, record.relation_to(caller.id))?;
        Ok(record)
    }

    pub async fn update(
        &self,
        caller: &User,
        id: Uuid,
        request: UpdateMedicalRecordRequest,
    ) -> Result<MedicalRecord, AppError> {
        let mut record = self.record(id).await?;
        authorize(caller, Resource::MedicalRecord, Action::Update, record.relation_to(caller.id))?;

        if let Some(diagnosis) = request.diagnosis.filter(|d| !d.trim().is_empty()) {
            record.diagnosis = diagnosis;
        }
        if let Some(entries) = request.prescription {
            record.prescription = prescriptions(entries)?;
        }
        if let Some(lab_reports) = request.lab_reports {
            record.lab_reports = lab_reports;
        }
        if let Some(vitals) = request.vitals {
            record.vitals = vitals;
        }
        if let Some(notes) = request.notes {
            record.notes = Some(notes);
        }
        if let Some(date) = request.follow_up_date {
            record.follow_up_date = Some(date);
        }
        if let Some(attachments) = request.attachments {
            record.attachments = attachments.into_iter().map(Into::into).collect();
        }

        let saved = self
            .store
            .update_medical_record(record)
            .await
            .map_err(MedicalRecordError::from)?;
        info!("Medical record {} updated", saved.id);
        Ok(saved)
    }
}
