use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::models::{ClientCommand, ServerEvent};
use crate::services::{dispatch, RoomRegistry};

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(registry): State<RoomRegistry>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

async fn handle_socket(socket: WebSocket, registry: RoomRegistry) {
    let (mut sink, mut stream) = socket.split();
    let (connection, mut events) = registry.connect().await;

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to encode signaling event: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(text.as_str()) {
                Ok(command) => dispatch(&registry, connection, command).await,
                Err(e) => {
                    debug!("Unparseable frame on {}: {}", connection, e);
                    registry
                        .send_to(
                            connection,
                            ServerEvent::Error {
                                message: format!("Invalid message: {}", e),
                            },
                        )
                        .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Socket error on {}: {}", connection, e);
                break;
            }
        }
    }

    // Dropping the registered sender ends the writer task.
    registry.disconnect(connection).await;
    let _ = writer.await;
}
