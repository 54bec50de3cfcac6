//! WebRTC signaling relay.
//!
//! Peers join a room over a WebSocket and exchange opaque SDP/ICE payloads
//! addressed by user id. The server keeps no call state beyond who is
//! connected where: the [`RoomRegistry`] is created once at start-up and
//! handed to [`router::signaling_routes`].

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::{dispatch, ConnectionId, RoomRegistry};
