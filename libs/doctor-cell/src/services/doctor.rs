use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AvailabilityRepository, DoctorRepository, Store};
use shared_models::availability::{DoctorAvailability, TimeSlot};
use shared_models::doctor::DoctorProfile;

use crate::models::DoctorError;

struct SampleDoctor {
    name: &'static str,
    specialty: &'static str,
    experience: &'static str,
    education: &'static str,
    /// (day_of_week, [(start, end)])
    week: &'static [(u8, &'static [(&'static str, &'static str)])],
}

const SAMPLE_DOCTORS: &[SampleDoctor] = &[
    SampleDoctor {
        name: "Sarah Johnson",
        specialty: "Cardiology",
        experience: "15 years",
        education: "MD, Harvard Medical School",
        week: &[
            (1, &[("09:00", "10:00"), ("14:00", "15:00"), ("16:00", "17:00")]),
            (2, &[("10:00", "11:00"), ("15:00", "16:00")]),
            (3, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (4, &[("11:00", "12:00"), ("16:00", "17:00")]),
            (5, &[("09:00", "10:00"), ("14:00", "15:00")]),
        ],
    },
    SampleDoctor {
        name: "Michael Chen",
        specialty: "Neurology",
        experience: "12 years",
        education: "MD, Stanford Medical School",
        week: &[
            (1, &[("10:00", "11:00"), ("15:00", "16:00")]),
            (2, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (3, &[("11:00", "12:00"), ("16:00", "17:00")]),
            (4, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (5, &[("10:00", "11:00"), ("15:00", "16:00")]),
        ],
    },
    SampleDoctor {
        name: "Emily Brown",
        specialty: "Pediatrics",
        experience: "10 years",
        education: "MD, Johns Hopkins Medical School",
        week: &[
            (1, &[("11:00", "12:00"), ("16:00", "17:00")]),
            (2, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (3, &[("10:00", "11:00"), ("15:00", "16:00")]),
            (4, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (5, &[("11:00", "12:00"), ("16:00", "17:00")]),
        ],
    },
    SampleDoctor {
        name: "James Wilson",
        specialty: "Orthopedics",
        experience: "18 years",
        education: "MD, Mayo Clinic School of Medicine",
        week: &[
            (1, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (2, &[("11:00", "12:00"), ("16:00", "17:00")]),
            (3, &[("10:00", "11:00"), ("15:00", "16:00")]),
            (4, &[("09:00", "10:00"), ("14:00", "15:00")]),
            (5, &[("11:00", "12:00"), ("16:00", "17:00")]),
        ],
    },
];

pub struct DoctorService {
    store: Arc<dyn Store>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Directory listing, optionally narrowed to a specialty (case-insensitive).
    pub async fn list_doctors(&self, specialty: Option<&str>) -> Result<Vec<DoctorProfile>, DoctorError> {
        let doctors = self.store.list_doctors().await?;
        let Some(specialty) = specialty.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(doctors);
        };
        debug!("Filtering doctors by specialty {}", specialty);
        Ok(doctors
            .into_iter()
            .filter(|d| d.specialty.eq_ignore_ascii_case(specialty))
            .collect())
    }

    pub async fn get_doctor(&self, id: Uuid) -> Result<DoctorProfile, DoctorError> {
        self.store.find_doctor(id).await?.ok_or(DoctorError::NotFound)
    }

    /// Seeds the four sample doctors and their weekday schedules. Running it
    /// again resets their schedules instead of adding duplicates.
    pub async fn add_samples(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        let existing = self.store.list_doctors().await?;
        let mut seeded = Vec::with_capacity(SAMPLE_DOCTORS.len());

        for sample in SAMPLE_DOCTORS {
            let id = existing
                .iter()
                .find(|d| d.name == sample.name)
                .map(|d| d.id)
                .unwrap_or_else(Uuid::new_v4);

            let mut profile = DoctorProfile::new(id, sample.name, sample.specialty);
            profile.experience = Some(sample.experience.to_string());
            profile.education = Some(sample.education.to_string());
            let profile = self.store.upsert_doctor(profile).await?;

            for (day, slots) in sample.week {
                let slots = slots.iter().map(|(start, end)| TimeSlot::new(start, end)).collect();
                self.store
                    .upsert_availability(DoctorAvailability::new(profile.id, *day, slots))
                    .await?;
            }
            seeded.push(profile);
        }

        info!("Seeded {} sample doctors", seeded.len());
        Ok(seeded)
    }
}
