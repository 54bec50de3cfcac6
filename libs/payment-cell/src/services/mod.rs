pub mod payment;
pub mod stripe;
pub mod webhook;

pub use payment::PaymentService;
pub use stripe::StripeClient;
