pub mod consultation;
pub mod twilio;

pub use consultation::VideoConsultationService;
pub use twilio::TwilioVideoClient;
