pub mod access;
pub mod appointment;
pub mod auth;
pub mod availability;
pub mod doctor;
pub mod emergency;
pub mod error;
pub mod medical_record;
pub mod notification;
pub mod payment;
pub mod user;
