use tracing::debug;

use crate::models::ClientCommand;
use crate::services::registry::{ConnectionId, RoomRegistry};

/// Applies one client frame. Every connection routes its frames through here.
pub async fn dispatch(registry: &RoomRegistry, connection: ConnectionId, command: ClientCommand) {
    match command {
        ClientCommand::JoinRoom { room_id, user_id } => {
            registry.join(connection, &room_id, &user_id).await;
        }
        ClientCommand::Signal {
            user_id,
            caller_id,
            signal,
        } => {
            let delivered = registry.relay(&user_id, &caller_id, signal).await;
            debug!("Signal {} -> {} delivered to {} connections", caller_id, user_id, delivered);
        }
    }
}
