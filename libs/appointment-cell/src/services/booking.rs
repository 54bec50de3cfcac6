use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::SlotView;
use doctor_cell::AvailabilityService;
use notification_cell::services::notifier::spawn_new_appointment_notifications;
use shared_database::{
    AppState, AppointmentRepository, AvailabilityRepository, DoctorRepository, Store, StoreError,
};
use shared_models::access::{authorize, Action, Resource};
use shared_models::appointment::{Appointment, AppointmentStatus, TransitionPolicy};
use shared_models::auth::{Role, User};
use shared_models::availability::{day_of_week, is_valid_time};
use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, BookingError};

pub fn parse_date(value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDate(value.to_string()))
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A booking form whose required fields are present and well formed.
struct ValidBooking<'a> {
    name: &'a str,
    date: NaiveDate,
    time: &'a str,
    symptoms: &'a str,
}

fn validate_booking(request: &BookAppointmentRequest, today: NaiveDate) -> Result<ValidBooking<'_>, BookingError> {
    let (Some(name), Some(date), Some(time), Some(symptoms)) = (
        required(&request.name),
        required(&request.date),
        required(&request.time),
        required(&request.symptoms),
    ) else {
        return Err(BookingError::MissingFields);
    };

    let date = parse_date(date)?;
    if !is_valid_time(time) {
        return Err(BookingError::InvalidTime(time.to_string()));
    }
    if date < today {
        return Err(BookingError::PastDate);
    }

    Ok(ValidBooking { name, date, time, symptoms })
}

pub struct BookingService {
    store: Arc<dyn Store>,
    policy: TransitionPolicy,
    state: AppState,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            policy: state.config.transition_policy,
            state: state.clone(),
        }
    }

    /// Doctors see the appointments they hold, everyone else their own bookings.
    pub async fn list_appointments(&self, caller: &User) -> Result<Vec<Appointment>, BookingError> {
        let appointments = match caller.role {
            Role::Doctor => self.store.list_appointments_for_doctor(caller.id).await?,
            _ => self.store.list_appointments_for_patient(caller.id).await?,
        };
        debug!("Listed {} appointments for {}", appointments.len(), caller.id);
        Ok(appointments)
    }

    pub async fn available_slots(&self, doctor_id: Uuid, date: &str) -> Result<Vec<SlotView>, BookingError> {
        let date = parse_date(date)?;
        Ok(AvailabilityService::new(self.store.clone())
            .open_slots_on(doctor_id, date)
            .await?)
    }

    pub async fn book(&self, caller: &User, request: BookAppointmentRequest) -> Result<Appointment, BookingError> {
        self.book_on(caller, request, Utc::now().date_naive()).await
    }

    /// Books relative to `today`, which bounds the earliest allowed date.
    pub async fn book_on(
        &self,
        caller: &User,
        request: BookAppointmentRequest,
        today: NaiveDate,
    ) -> Result<Appointment, BookingError> {
        let booking = validate_booking(&request, today)?;

        if self
            .store
            .find_active_for_patient(caller.id, booking.date, booking.time)
            .await?
            .is_some()
        {
            return Err(BookingError::AlreadyBooked);
        }

        let mut appointment = Appointment::new(
            caller.id,
            booking.name,
            request.doctor_id,
            booking.date,
            booking.time,
            booking.symptoms,
        );
        appointment.consultation_type = request.consultation_type.unwrap_or_default();

        if let Some(doctor_id) = request.doctor_id {
            let end = self
                .claim_doctor_slot(doctor_id, booking.date, booking.time, request.end_time.as_deref())
                .await?;
            appointment.slot_end = Some(end);
            appointment.fee = self
                .store
                .find_doctor(doctor_id)
                .await?
                .and_then(|d| d.consultation_fee);
        }

        let saved = match self.store.insert_appointment(appointment.clone()).await {
            Ok(saved) => saved,
            Err(e) => {
                self.release_claim(&appointment).await;
                return Err(match e {
                    StoreError::Duplicate(_) => BookingError::AlreadyBooked,
                    other => other.into(),
                });
            }
        };

        info!(
            "Appointment {} booked for patient {} on {} at {}",
            saved.id, saved.patient_id, saved.date, saved.time
        );

        if saved.doctor_id.is_some() {
            spawn_new_appointment_notifications(&self.state, saved.clone());
        }
        Ok(saved)
    }

    /// Claims the doctor's slot for `[time, end)` and returns `end`. Without an
    /// explicit end the slot containing `time` is used.
    async fn claim_doctor_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: &str,
        end_time: Option<&str>,
    ) -> Result<String, BookingError> {
        let day = day_of_week(date);

        let end = match end_time.map(str::trim).filter(|e| !e.is_empty()) {
            Some(end) => {
                if !is_valid_time(end) {
                    return Err(BookingError::InvalidTime(end.to_string()));
                }
                if end <= time {
                    return Err(BookingError::InvalidTime(format!("{}-{}", time, end)));
                }
                end.to_string()
            }
            None => self
                .store
                .find_availability(doctor_id, day)
                .await?
                .and_then(|availability| availability.slot_containing(time).map(|slot| slot.end.clone()))
                .ok_or(BookingError::SlotUnavailable)?,
        };

        if !self.store.claim_slot(doctor_id, day, time, &end).await? {
            warn!("Slot {}-{} on {} for doctor {} is taken", time, end, date, doctor_id);
            return Err(BookingError::SlotUnavailable);
        }
        Ok(end)
    }

    /// Frees the doctor slot held by an appointment. Failures are logged only.
    async fn release_claim(&self, appointment: &Appointment) {
        let (Some(doctor_id), Some(end)) = (appointment.doctor_id, appointment.slot_end.as_deref()) else {
            return;
        };
        let day = day_of_week(appointment.date);
        match self.store.release_slot(doctor_id, day, &appointment.time, end).await {
            Ok(true) => debug!("Released slot {}-{} for doctor {}", appointment.time, end, doctor_id),
            Ok(false) => warn!("No booked slot {}-{} to release for doctor {}", appointment.time, end, doctor_id),
            Err(e) => warn!("Failed to release slot for appointment {}: {}", appointment.id, e),
        }
    }

    /// Takes the doctor slot back for a cancelled appointment being reopened.
    /// Returns whether a claim was made.
    async fn reclaim(&self, appointment: &Appointment) -> Result<bool, BookingError> {
        let (Some(doctor_id), Some(end)) = (appointment.doctor_id, appointment.slot_end.as_deref()) else {
            return Ok(false);
        };
        let day = day_of_week(appointment.date);
        if !self.store.claim_slot(doctor_id, day, &appointment.time, end).await? {
            warn!(
                "Cannot reactivate appointment {}: slot {}-{} for doctor {} is taken",
                appointment.id, appointment.time, end, doctor_id
            );
            return Err(BookingError::SlotUnavailable);
        }
        Ok(true)
    }

    async fn find(&self, id: Uuid) -> Result<Appointment, BookingError> {
        self.store.find_appointment(id).await?.ok_or(BookingError::NotFound)
    }

    pub async fn get_appointment(&self, caller: &User, id: Uuid) -> Result<Appointment, AppError> {
        let appointment = self.find(id).await?;
        authorize(caller, Resource::Appointment, Action::Read, appointment.relation_to(caller.id))?;
        Ok(appointment)
    }

    pub async fn update_status(&self, caller: &User, id: Uuid, status: &str) -> Result<Appointment, AppError> {
        let mut appointment = self.find(id).await?;
        authorize(
            caller,
            Resource::Appointment,
            Action::UpdateStatus,
            appointment.relation_to(caller.id),
        )?;

        let next: AppointmentStatus = status
            .trim()
            .parse()
            .map_err(BookingError::InvalidStatus)?;
        let previous = appointment.status;
        if !previous.can_transition_to(next, self.policy) {
            return Err(BookingError::InvalidTransition { from: previous, to: next }.into());
        }

        let reactivated = previous == AppointmentStatus::Cancelled && next.is_active();
        let reclaimed = reactivated && self.reclaim(&appointment).await?;

        appointment.status = next;
        let saved = match self.store.update_appointment(appointment.clone()).await {
            Ok(saved) => saved,
            Err(e) => {
                if reclaimed {
                    self.release_claim(&appointment).await;
                }
                return Err(match e {
                    StoreError::Duplicate(_) => BookingError::AlreadyBooked,
                    other => other.into(),
                }
                .into());
            }
        };

        if previous.is_active() && next == AppointmentStatus::Cancelled {
            self.release_claim(&saved).await;
        }

        info!("Appointment {} status {} -> {}", saved.id, previous, next);
        Ok(saved)
    }

    /// Only the booking patient may cancel; anyone else gets `NotFound`.
    pub async fn cancel(&self, caller: &User, id: Uuid) -> Result<Appointment, BookingError> {
        let mut appointment = self.find(id).await?;
        if appointment.patient_id != caller.id {
            return Err(BookingError::NotFound);
        }
        if appointment.status == AppointmentStatus::Completed {
            return Err(BookingError::CannotCancelCompleted);
        }

        let was_active = appointment.status.is_active();
        appointment.status = AppointmentStatus::Cancelled;
        let saved = self.store.update_appointment(appointment).await?;

        if was_active {
            self.release_claim(&saved).await;
        }

        info!("Appointment {} cancelled by patient {}", saved.id, caller.id);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(date: &str, time: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            name: Some("Pat".into()),
            date: Some(date.into()),
            time: Some(time.into()),
            symptoms: Some("cough".into()),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 10).unwrap()
    }

    #[test]
    fn blank_fields_are_missing() {
        let mut request = form("2030-01-10", "09:00");
        request.symptoms = Some("   ".into());
        assert!(matches!(validate_booking(&request, today()), Err(BookingError::MissingFields)));
    }

    #[test]
    fn yesterday_is_rejected_but_today_is_fine() {
        assert!(matches!(
            validate_booking(&form("2030-01-09", "09:00"), today()),
            Err(BookingError::PastDate)
        ));
        assert!(validate_booking(&form("2030-01-10", "09:00"), today()).is_ok());
    }

    #[test]
    fn malformed_date_and_time() {
        assert!(matches!(
            validate_booking(&form("10/01/2030", "09:00"), today()),
            Err(BookingError::InvalidDate(_))
        ));
        assert!(matches!(
            validate_booking(&form("2030-01-10", "9am"), today()),
            Err(BookingError::InvalidTime(_))
        ));
    }
}
