use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent by a browser, e.g.
/// `{"event":"join-room","data":{"roomId":"r1","userId":"u1"}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    JoinRoom {
        #[serde(alias = "roomId")]
        room_id: String,
        #[serde(alias = "userId")]
        user_id: String,
    },
    /// `user_id` is the recipient, `caller_id` the sender.
    Signal {
        #[serde(alias = "userId")]
        user_id: String,
        #[serde(alias = "callerId")]
        caller_id: String,
        signal: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    UserConnected(String),
    UserDisconnected(String),
    Signal {
        #[serde(rename = "userId")]
        user_id: String,
        signal: Value,
    },
    Error {
        message: String,
    },
}
