use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AvailabilityRepository, DoctorRepository, Store};
use shared_models::access::{authorize, Action, Relation, Resource};
use shared_models::auth::User;
use shared_models::availability::{day_of_week, is_valid_time, DoctorAvailability, TimeSlot};
use shared_models::error::AppError;

use crate::models::{DoctorError, SetAvailabilityRequest, SlotView};

pub struct AvailabilityService {
    store: Arc<dyn Store>,
}

fn check_range(start: &str, end: &str, what: &str) -> Result<(), DoctorError> {
    if !is_valid_time(start) || !is_valid_time(end) {
        return Err(DoctorError::InvalidAvailability(format!(
            "{} times must be HH:MM, got {}-{}",
            what, start, end
        )));
    }
    if start >= end {
        return Err(DoctorError::InvalidAvailability(format!(
            "{} start must be before end, got {}-{}",
            what, start, end
        )));
    }
    Ok(())
}

pub fn validate_request(request: &SetAvailabilityRequest) -> Result<(), DoctorError> {
    if request.day_of_week > 6 {
        return Err(DoctorError::InvalidAvailability(
            "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }
    for slot in &request.time_slots {
        check_range(&slot.start, &slot.end, "Slot")?;
    }
    for pause in &request.break_time {
        check_range(&pause.start, &pause.end, "Break")?;
    }
    Ok(())
}

/// Replacement slots keep the booked flag of an identical existing slot.
fn carry_bookings(previous: Option<&DoctorAvailability>, slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
    let Some(previous) = previous else {
        return slots;
    };
    slots
        .into_iter()
        .map(|mut slot| {
            slot.is_booked = previous
                .time_slots
                .iter()
                .any(|old| old.is_booked && old.start == slot.start && old.end == slot.end);
            slot
        })
        .collect()
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Slot list for one doctor and weekday; empty when none is configured.
    pub async fn get_availability(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<TimeSlot>, DoctorError> {
        let day = self.store.find_availability(doctor_id, day_of_week).await?;
        Ok(day.map(|d| d.time_slots).unwrap_or_default())
    }

    pub async fn weekly_availability(&self, doctor_id: Uuid) -> Result<Vec<DoctorAvailability>, DoctorError> {
        Ok(self.store.list_availability(doctor_id).await?)
    }

    /// Unbooked slots on a calendar date. A day marked unavailable has none.
    pub async fn open_slots_on(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<SlotView>, DoctorError> {
        let weekday = day_of_week(date);
        debug!("Open slots for doctor {} on {} (day {})", doctor_id, date, weekday);

        let slots = match self.store.find_availability(doctor_id, weekday).await? {
            Some(day) if day.is_available => day.open_slots().map(SlotView::from).collect(),
            _ => Vec::new(),
        };
        Ok(slots)
    }

    pub async fn set_availability(
        &self,
        caller: &User,
        doctor_id: Uuid,
        request: SetAvailabilityRequest,
    ) -> Result<DoctorAvailability, AppError> {
        authorize(
            caller,
            Resource::Availability,
            Action::Update,
            Relation::for_owner(caller.id, doctor_id),
        )?;
        validate_request(&request)?;

        if self.store.find_doctor(doctor_id).await?.is_none() {
            return Err(DoctorError::NotFound.into());
        }

        let previous = self.store.find_availability(doctor_id, request.day_of_week).await?;
        let slots = carry_bookings(previous.as_ref(), request.time_slots);

        let mut day = DoctorAvailability::new(doctor_id, request.day_of_week, slots);
        day.is_available = request.is_available.unwrap_or(true);
        day.break_time = request.break_time;

        let saved = self.store.upsert_availability(day).await?;
        info!(
            "Availability for doctor {} day {} set to {} slots",
            doctor_id,
            saved.day_of_week,
            saved.time_slots.len()
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::availability::BreakTime;

    fn request(slots: Vec<TimeSlot>) -> SetAvailabilityRequest {
        SetAvailabilityRequest {
            day_of_week: 1,
            time_slots: slots,
            is_available: None,
            break_time: Vec::new(),
        }
    }

    #[test]
    fn rejects_reversed_and_malformed_slots() {
        assert!(validate_request(&request(vec![TimeSlot::new("10:00", "09:00")])).is_err());
        assert!(validate_request(&request(vec![TimeSlot::new("10:00", "10:00")])).is_err());
        assert!(validate_request(&request(vec![TimeSlot::new("9:00", "10:00")])).is_err());
        assert!(validate_request(&request(vec![TimeSlot::new("09:00", "10:00")])).is_ok());
    }

    #[test]
    fn rejects_bad_day_and_break() {
        let mut bad_day = request(vec![]);
        bad_day.day_of_week = 7;
        assert!(validate_request(&bad_day).is_err());

        let mut bad_break = request(vec![]);
        bad_break.break_time = vec![BreakTime { start: "13:00".into(), end: "12:00".into() }];
        assert!(validate_request(&bad_break).is_err());
    }

    #[test]
    fn bookings_survive_identical_replacement() {
        let mut previous = DoctorAvailability::new(Uuid::new_v4(), 1, vec![TimeSlot::new("09:00", "10:00")]);
        previous.book_time_slot("09:00", "10:00");

        let slots = carry_bookings(
            Some(&previous),
            vec![TimeSlot::new("09:00", "10:00"), TimeSlot::new("10:00", "11:00")],
        );

        assert!(slots[0].is_booked);
        assert!(!slots[1].is_booked);
    }
}
