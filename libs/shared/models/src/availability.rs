use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable interval. `start` and `end` are zero-padded `HH:MM` strings,
/// so lexicographic comparison orders them correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub is_booked: bool,
}

impl TimeSlot {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            is_booked: false,
        }
    }

    pub fn covers(&self, start: &str, end: &str) -> bool {
        self.start.as_str() <= start && self.end.as_str() >= end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakTime {
    pub start: String,
    pub end: String,
}

/// One doctor's schedule for one day of the week. There is at most one of
/// these per (doctor_id, day_of_week).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub id: Uuid,
    pub doctor_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    pub time_slots: Vec<TimeSlot>,
    pub is_available: bool,
    #[serde(default)]
    pub break_time: Vec<BreakTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DoctorAvailability {
    pub fn new(doctor_id: Uuid, day_of_week: u8, time_slots: Vec<TimeSlot>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week,
            time_slots,
            is_available: true,
            break_time: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_time_slot_available(&self, start: &str, end: &str) -> bool {
        self.time_slots
            .iter()
            .any(|slot| !slot.is_booked && slot.covers(start, end))
    }

    /// Marks the first unbooked slot covering `[start, end)` as booked.
    pub fn book_time_slot(&mut self, start: &str, end: &str) -> bool {
        match self
            .time_slots
            .iter_mut()
            .find(|slot| !slot.is_booked && slot.covers(start, end))
        {
            Some(slot) => {
                slot.is_booked = true;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn release_time_slot(&mut self, start: &str, end: &str) -> bool {
        match self
            .time_slots
            .iter_mut()
            .find(|slot| slot.is_booked && slot.covers(start, end))
        {
            Some(slot) => {
                slot.is_booked = false;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// The slot whose half-open range `[start, end)` contains `time`.
    pub fn slot_containing(&self, time: &str) -> Option<&TimeSlot> {
        self.time_slots
            .iter()
            .find(|slot| slot.start.as_str() <= time && time < slot.end.as_str())
    }

    pub fn open_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.time_slots.iter().filter(|slot| !slot.is_booked)
    }
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"))
}

/// Zero-padded 24-hour `HH:MM`.
pub fn is_valid_time(value: &str) -> bool {
    time_pattern().is_match(value)
}

pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}
