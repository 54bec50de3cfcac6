//! Video consultations on a Twilio-compatible Video API.
//!
//! Every video appointment maps to one provider room named
//! `appointment-{id}`. Participants get short-lived access tokens signed
//! with the API key secret; ending the consultation completes the room and
//! the appointment together.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::{TwilioVideoClient, VideoConsultationService};
