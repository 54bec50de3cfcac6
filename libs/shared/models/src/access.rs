//! Capability checks shared by every cell.
//!
//! Handlers work out how the caller relates to a record ([`Relation`]) and ask
//! [`authorize`] whether their role may perform an [`Action`] on a
//! [`Resource`] under that relation. The rules live in one table instead of
//! being repeated as role conditionals in each endpoint.

use std::fmt;

use uuid::Uuid;

use crate::auth::{Role, User};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Appointment,
    Availability,
    Doctor,
    Payment,
    MedicalRecord,
    Emergency,
    UserAccount,
    VideoRoom,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    List,
    Create,
    Update,
    UpdateStatus,
    Cancel,
    Refund,
    Join,
    End,
}

/// How the caller is connected to the record being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Patient,
    Doctor,
    Owner,
    Unrelated,
}

impl Relation {
    /// Relation for two-party records (appointments, payments, medical records).
    pub fn for_participants(user_id: Uuid, patient_id: Uuid, doctor_id: Option<Uuid>) -> Self {
        if patient_id == user_id {
            Relation::Patient
        } else if doctor_id == Some(user_id) {
            Relation::Doctor
        } else {
            Relation::Unrelated
        }
    }

    /// Relation for single-owner records.
    pub fn for_owner(user_id: Uuid, owner_id: Uuid) -> Self {
        if user_id == owner_id {
            Relation::Owner
        } else {
            Relation::Unrelated
        }
    }

    fn is_participant(self) -> bool {
        matches!(self, Relation::Patient | Relation::Doctor)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Appointment => "appointment",
            Resource::Availability => "availability",
            Resource::Doctor => "doctor",
            Resource::Payment => "payment",
            Resource::MedicalRecord => "medical record",
            Resource::Emergency => "emergency",
            Resource::UserAccount => "user",
            Resource::VideoRoom => "video room",
            Resource::Notification => "notification",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Read => "view",
            Action::List => "list",
            Action::Create => "create",
            Action::Update => "update",
            Action::UpdateStatus => "update the status of",
            Action::Cancel => "cancel",
            Action::Refund => "refund",
            Action::Join => "join",
            Action::End => "end",
        };
        write!(f, "{}", name)
    }
}

pub fn permits(role: Role, resource: Resource, action: Action, relation: Relation) -> bool {
    use Action::*;
    use Resource::*;

    let admin = role == Role::Admin;

    match (resource, action) {
        (Appointment, Read) => relation.is_participant() || admin,
        (Appointment, UpdateStatus) => relation.is_participant(),
        (Appointment, Cancel) => relation == Relation::Patient,

        (Availability, Read) => true,
        (Availability, Update) => (role == Role::Doctor && relation == Relation::Owner) || admin,

        (Doctor, Read) | (Doctor, List) => true,
        (Doctor, Create) => admin,

        (VideoRoom, Join) | (VideoRoom, Read) | (VideoRoom, End) => relation.is_participant(),

        (Payment, Create) => relation == Relation::Patient,
        (Payment, Read) => relation.is_participant() || admin,
        (Payment, Refund) => relation == Relation::Doctor || admin,

        (MedicalRecord, Create) => role == Role::Doctor,
        (MedicalRecord, List) => true,
        (MedicalRecord, Read) => relation.is_participant(),
        (MedicalRecord, Update) => relation == Relation::Doctor,

        (Emergency, Read) | (Emergency, Update) => relation == Relation::Owner,

        (UserAccount, List) => admin,
        (UserAccount, Read) => relation == Relation::Owner || admin,
        (UserAccount, Update) => relation == Relation::Owner,

        (Notification, Read) | (Notification, Update) => relation == Relation::Owner,

        _ => false,
    }
}

pub fn authorize(
    user: &User,
    resource: Resource,
    action: Action,
    relation: Relation,
) -> Result<(), AppError> {
    if permits(user.role, resource, action, relation) {
        Ok(())
    } else {
        tracing::debug!(
            "Denied {:?} on {:?} for user {} ({}, {:?})",
            action, resource, user.id, user.role, relation
        );
        Err(AppError::Forbidden(format!("Not authorized to {} this {}", action, resource)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_status_requires_participant() {
        assert!(permits(Role::Patient, Resource::Appointment, Action::UpdateStatus, Relation::Patient));
        assert!(permits(Role::Doctor, Resource::Appointment, Action::UpdateStatus, Relation::Doctor));
        assert!(!permits(Role::Doctor, Resource::Appointment, Action::UpdateStatus, Relation::Unrelated));
        assert!(!permits(Role::Admin, Resource::Appointment, Action::UpdateStatus, Relation::Unrelated));
    }

    #[test]
    fn only_the_patient_cancels() {
        assert!(permits(Role::Patient, Resource::Appointment, Action::Cancel, Relation::Patient));
        assert!(!permits(Role::Doctor, Resource::Appointment, Action::Cancel, Relation::Doctor));
    }

    #[test]
    fn admin_can_list_users_but_patient_cannot() {
        assert!(permits(Role::Admin, Resource::UserAccount, Action::List, Relation::Unrelated));
        assert!(!permits(Role::Patient, Resource::UserAccount, Action::List, Relation::Unrelated));
    }

    #[test]
    fn relation_for_participants() {
        let patient = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert_eq!(Relation::for_participants(patient, patient, Some(doctor)), Relation::Patient);
        assert_eq!(Relation::for_participants(doctor, patient, Some(doctor)), Relation::Doctor);
        assert_eq!(Relation::for_participants(stranger, patient, None), Relation::Unrelated);
    }

    #[test]
    fn authorize_returns_forbidden() {
        let user = User { id: Uuid::new_v4(), email: None, role: Role::Patient, issued_at: None };
        let err = authorize(&user, Resource::Emergency, Action::Read, Relation::Unrelated).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
