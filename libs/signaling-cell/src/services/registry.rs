use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::ServerEvent;

pub type ConnectionId = Uuid;
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

struct Connection {
    sender: EventSender,
    /// Set by the first join.
    user_id: Option<String>,
    rooms: HashSet<String>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    users: HashMap<String, HashSet<ConnectionId>>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl Registry {
    /// Queues `event` on every listed connection except `skip`. Returns the
    /// number of connections it was queued on.
    fn fan_out<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a ConnectionId>,
        skip: Option<ConnectionId>,
        event: &ServerEvent,
    ) -> usize {
        let mut delivered = 0;
        for id in targets {
            if Some(*id) == skip {
                continue;
            }
            match self.connections.get(id) {
                Some(conn) if conn.sender.send(event.clone()).is_ok() => delivered += 1,
                Some(_) => debug!("Connection {} already closed", id),
                None => {}
            }
        }
        delivered
    }
}

/// Process-local map of rooms, users and live connections.
///
/// Events go out through per-connection unbounded channels, so no lock is
/// held while a socket is written.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection and returns the receiving half of its
    /// outbound event queue.
    pub async fn connect(&self) -> (ConnectionId, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        self.inner.write().await.connections.insert(
            id,
            Connection {
                sender,
                user_id: None,
                rooms: HashSet::new(),
            },
        );
        debug!("Signaling connection {} opened", id);
        (id, receiver)
    }

    /// Adds the connection to `room_id` as `user_id` and tells the other
    /// members. Returns how many were told.
    pub async fn join(&self, connection: ConnectionId, room_id: &str, user_id: &str) -> usize {
        let mut registry = self.inner.write().await;

        let Some(conn) = registry.connections.get_mut(&connection) else {
            warn!("Join from unknown connection {}", connection);
            return 0;
        };
        let previous = conn.user_id.replace(user_id.to_string());
        conn.rooms.insert(room_id.to_string());

        if let Some(previous) = previous.filter(|p| p != user_id) {
            warn!("Connection {} switched user {} -> {}", connection, previous, user_id);
            if let Some(connections) = registry.users.get_mut(&previous) {
                connections.remove(&connection);
                if connections.is_empty() {
                    registry.users.remove(&previous);
                }
            }
        }

        registry
            .users
            .entry(user_id.to_string())
            .or_default()
            .insert(connection);
        registry
            .rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(connection);

        let notified = match registry.rooms.get(room_id) {
            Some(members) => registry.fan_out(
                members,
                Some(connection),
                &ServerEvent::UserConnected(user_id.to_string()),
            ),
            None => 0,
        };

        info!("User {} joined room {} ({} peers notified)", user_id, room_id, notified);
        notified
    }

    /// Sends `signal` from `from_user` to every live connection of
    /// `target_user`. Room membership is not checked.
    pub async fn relay(&self, target_user: &str, from_user: &str, signal: serde_json::Value) -> usize {
        let registry = self.inner.read().await;
        let event = ServerEvent::Signal {
            user_id: from_user.to_string(),
            signal,
        };

        let delivered = match registry.users.get(target_user) {
            Some(connections) => registry.fan_out(connections, None, &event),
            None => 0,
        };

        if delivered == 0 {
            debug!("Signal from {} to {} dropped: no live connection", from_user, target_user);
        }
        delivered
    }

    /// Queues an event for a single connection.
    pub async fn send_to(&self, connection: ConnectionId, event: ServerEvent) -> bool {
        let registry = self.inner.read().await;
        registry
            .connections
            .get(&connection)
            .map(|conn| conn.sender.send(event).is_ok())
            .unwrap_or(false)
    }

    /// Removes the connection everywhere and tells the remaining members of
    /// each room it was in, unless the same user is still there on another
    /// connection.
    pub async fn disconnect(&self, connection: ConnectionId) {
        let mut registry = self.inner.write().await;

        let Some(conn) = registry.connections.remove(&connection) else {
            return;
        };

        if let Some(user_id) = &conn.user_id {
            if let Some(connections) = registry.users.get_mut(user_id) {
                connections.remove(&connection);
                if connections.is_empty() {
                    registry.users.remove(user_id);
                }
            }
        }

        for room_id in &conn.rooms {
            let Some(members) = registry.rooms.get_mut(room_id) else {
                continue;
            };
            members.remove(&connection);
            if members.is_empty() {
                registry.rooms.remove(room_id);
                debug!("Room {} closed", room_id);
                continue;
            }

            let (Some(user_id), Some(members)) = (&conn.user_id, registry.rooms.get(room_id)) else {
                continue;
            };
            let still_present = members.iter().any(|member| {
                registry
                    .connections
                    .get(member)
                    .is_some_and(|other| other.user_id.as_ref() == Some(user_id))
            });
            if !still_present {
                registry.fan_out(members, None, &ServerEvent::UserDisconnected(user_id.clone()));
            }
        }

        info!(
            "Signaling connection {} closed (user {:?})",
            connection,
            conn.user_id.as_deref()
        );
    }

    /// User ids currently in a room, sorted.
    pub async fn room_members(&self, room_id: &str) -> Vec<String> {
        let registry = self.inner.read().await;
        let mut members: Vec<String> = registry
            .rooms
            .get(room_id)
            .into_iter()
            .flatten()
            .filter_map(|id| registry.connections.get(id))
            .filter_map(|conn| conn.user_id.clone())
            .collect();
        members.sort();
        members.dedup();
        members
    }

    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}
