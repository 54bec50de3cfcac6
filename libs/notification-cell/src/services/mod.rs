pub mod email;
pub mod notifier;
pub mod sms;

pub use email::EmailClient;
pub use notifier::NotificationService;
pub use sms::SmsClient;
