pub mod memory;
pub mod postgrest;
pub mod state;
pub mod store;
pub mod supabase;

pub use memory::MemoryStore;
pub use postgrest::SupabaseStore;
pub use state::AppState;
pub use store::{
    AppointmentRepository, AvailabilityRepository, DoctorRepository, EmergencyRepository,
    MedicalRecordRepository, NotificationRepository, PaymentRepository, Store, StoreError,
    StoreResult, UserRepository,
};
