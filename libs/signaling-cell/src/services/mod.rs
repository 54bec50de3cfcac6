pub mod registry;
pub mod relay;

pub use registry::{ConnectionId, RoomRegistry};
pub use relay::dispatch;
