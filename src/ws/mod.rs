use axum::{
    extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    extract::{Query, State},
    response::Response,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error};

use crate::auth::validate_jwt;
use crate::state::AppState;
use crate::store::messages::Message;
use crate::store::Id;

/// Connected sockets keyed by user id. Registration happens at handshake, so
/// a user's "room" is simply their entry here; one user may hold several
/// connections.
#[derive(Clone, Default)]
pub struct ChatRegistry {
    connections: Arc<RwLock<HashMap<Id, HashMap<u64, mpsc::UnboundedSender<WsMessage>>>>>,
    next_connection: Arc<AtomicU64>,
}

impl ChatRegistry {
    async fn register(&self, user_id: Id) -> (u64, mpsc::UnboundedReceiver<WsMessage>) {
        let connection_id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(connection_id, tx);
        (connection_id, rx)
    }

    async fn deregister(&self, user_id: &Id, connection_id: u64) {
        let mut connections = self.connections.write().await;
        if let Some(sockets) = connections.get_mut(user_id) {
            sockets.remove(&connection_id);
            if sockets.is_empty() {
                connections.remove(user_id);
            }
        }
    }

    /// Delivers a frame to every connected socket.
    pub async fn broadcast(&self, frame: &Value) {
        let text = frame.to_string();
        let connections = self.connections.read().await;
        for sockets in connections.values() {
            for tx in sockets.values() {
                let _ = tx.send(WsMessage::Text(text.clone()));
            }
        }
    }

    /// Delivers a frame to the sockets of a single user. Delivery is at most
    /// once; a socket gone between save and send simply misses the frame.
    pub async fn send_to(&self, user_id: &Id, frame: &Value) {
        let text = frame.to_string();
        let connections = self.connections.read().await;
        if let Some(sockets) = connections.get(user_id) {
            for tx in sockets.values() {
                let _ = tx.send(WsMessage::Text(text.clone()));
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageData {
    message: String,
    #[serde(default)]
    is_public: bool,
    receiver_id: Option<Id>,
}

fn frame(event: &str, data: Value) -> WsMessage {
    WsMessage::Text(json!({ "event": event, "data": data }).to_string())
}

/// `GET /ws?token=<jwt>` upgrade endpoint for the real-time channel.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, query.token, socket))
}

async fn handle_socket(state: AppState, token: Option<String>, mut socket: WebSocket) {
    // Handshake credential is verified exactly like the HTTP bearer token;
    // failure terminates the socket before any message handling exists.
    let claims = token
        .as_deref()
        .and_then(|token| validate_jwt(token, &state.config.jwt_key).ok());

    let Some(claims) = claims else {
        let _ = socket
            .send(frame("authentication_failed", json!("Failed to authenticate.")))
            .await;
        let _ = socket.close().await;
        return;
    };

    let user_id = claims.sub;
    let (connection_id, mut rx) = state.chat.register(user_id.clone()).await;
    debug!("socket connected for user {}", user_id);

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            WsMessage::Text(text) => {
                let Ok(incoming) = serde_json::from_str::<Frame>(&text) else {
                    state
                        .chat
                        .send_to(&user_id, &json!({
                            "event": "message_failed",
                            "data": "Malformed frame.",
                        }))
                        .await;
                    continue;
                };
                if incoming.event == "sendMessage" {
                    handle_send_message(&state, &user_id, incoming.data).await;
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    state.chat.deregister(&user_id, connection_id).await;
    writer.abort();
    debug!("socket disconnected for user {}", user_id);
}

/// Persists the message exactly as the HTTP path would, then fans it out:
/// broadcast when public, receiver-only when private. Failures are logged
/// and reported back to the sender as `message_failed`.
async fn handle_send_message(state: &AppState, sender_id: &Id, data: Value) {
    let fail = |reason: &str| json!({ "event": "message_failed", "data": reason });

    let Ok(data) = serde_json::from_value::<SendMessageData>(data) else {
        state
            .chat
            .send_to(sender_id, &fail("Invalid message payload."))
            .await;
        return;
    };

    if data.message.trim().is_empty() {
        state
            .chat
            .send_to(sender_id, &fail("Message text is missing or empty."))
            .await;
        return;
    }

    let receiver_id = if data.is_public {
        None
    } else {
        match data.receiver_id {
            Some(id) => Some(id),
            None => {
                state
                    .chat
                    .send_to(sender_id, &fail("A private message requires a receiver."))
                    .await;
                return;
            }
        }
    };

    let record = Message {
        id: Id::new(),
        sender_id: sender_id.clone(),
        receiver_id,
        message: data.message,
        is_public: data.is_public,
        created_at: Utc::now(),
        seen_at: None,
    };

    if let Err(err) = state.store.insert_message(&record).await {
        error!("failed to persist realtime message: {}", err);
        state
            .chat
            .send_to(sender_id, &fail("Message could not be saved."))
            .await;
        return;
    }

    if record.is_public {
        let outgoing = json!({ "event": "publicMessageReceived", "data": record });
        state.chat.broadcast(&outgoing).await;
    } else if let Some(receiver_id) = &record.receiver_id {
        let outgoing = json!({ "event": "privateMessageReceived", "data": record });
        state.chat.send_to(receiver_id, &outgoing).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_registers_and_deregisters() {
        let registry = ChatRegistry::default();
        let user = Id::new();

        let (connection, mut rx) = registry.register(user.clone()).await;
        registry.send_to(&user, &json!({"event": "x"})).await;
        assert!(rx.recv().await.is_some());

        registry.deregister(&user, connection).await;
        registry.send_to(&user, &json!({"event": "x"})).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let registry = ChatRegistry::default();
        let (_a, mut rx_a) = registry.register(Id::new()).await;
        let (_b, mut rx_b) = registry.register(Id::new()).await;

        registry.broadcast(&json!({"event": "hello"})).await;
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }
}
