//! Live notification delivery over WebSocket
//!
//! Per-connection state machine:
//! `Connecting -> AwaitingAuth -> Authenticated | Unauthenticated ->
//! Streaming -> Closed`.
//!
//! The upgrade itself is unauthenticated; the FIRST client frame is the
//! bearer credential (quoted or unquoted, `Bearer ` prefix optional) and
//! is checked through the same state machine as the HTTP auth gateway. A
//! client that fails to authenticate within the grace window is closed
//! without ever receiving a data frame. Once authenticated, every payload
//! published to the user's channel is forwarded as a JSON-wrapped string;
//! a write failure or client disconnect closes the connection.

use crate::auth::middleware::validate_user;
use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// `GET /api/notifications/live` - upgrade and stream notifications
pub async fn notifications_live(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_notifications(state, socket))
}

async fn relay_notifications(state: Arc<AppState>, socket: WebSocket) {
    let grace = state.config.auth.ws_auth_grace();
    let (mut sink, mut stream) = socket.split();

    // Flipped by the read task once the credential checks out. Replaces a
    // mutex-guarded boolean: the relay side observes the flip or times out.
    let (auth_tx, mut auth_rx) = watch::channel(None::<i64>);

    let reader_state = state.clone();
    let mut reader = tokio::spawn(async move {
        // The first frame is the credential; later frames are read only to
        // notice the client going away.
        let mut awaiting_credential = true;
        while let Some(frame) = stream.next().await {
            let message = match frame {
                Ok(message) => message,
                Err(err) => {
                    debug!(error = %err, "notification client read failed");
                    return;
                }
            };

            if awaiting_credential {
                awaiting_credential = false;

                let credential = match &message {
                    Message::Text(text) => text.clone(),
                    _ => String::new(),
                };

                match validate_user(&reader_state, &credential).await {
                    Some(user_id) => {
                        info!(user_id, "client authenticated on notification stream");
                        let _ = auth_tx.send(Some(user_id));
                    }
                    None => {
                        info!("client not valid for notifications");
                        return;
                    }
                }
            }

            if matches!(message, Message::Close(_)) {
                return;
            }
        }
    });

    // AwaitingAuth: wait for the credential check, bounded by the grace
    // window. An authenticated connection is immune to the timer from the
    // moment the flip is observed.
    let user_id = match tokio::time::timeout(grace, auth_rx.changed()).await {
        Ok(Ok(())) => {
            let latest = *auth_rx.borrow();
            match latest {
                Some(user_id) => user_id,
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    reader.abort();
                    return;
                }
            }
        }
        // Timed out, or the read task hung up after rejecting the
        // credential. Either way: no data frame was ever sent.
        _ => {
            info!("closing notification client: no credential within grace window");
            let _ = sink.send(Message::Close(None)).await;
            reader.abort();
            return;
        }
    };

    // Streaming: subscribe with the AUTHENTICATED identity, never a
    // client-supplied value.
    let mut events = match state.notifier.subscribe(user_id).await {
        Ok(events) => events,
        Err(err) => {
            error!(user_id, error = %err, "failed to subscribe to notification channel");
            let _ = sink.send(Message::Close(None)).await;
            reader.abort();
            return;
        }
    };

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(payload) = event else { break };

                // Payloads cross the socket as JSON-wrapped strings.
                let frame = match serde_json::to_string(&payload) {
                    Ok(frame) => frame,
                    Err(err) => {
                        error!(user_id, error = %err, "failed to wrap notification payload");
                        continue;
                    }
                };

                if let Err(err) = sink.send(Message::Text(frame)).await {
                    debug!(user_id, error = %err, "write failed, closing notification stream");
                    break;
                }
            }
            // Client disconnect ends the read task; tear the subscription
            // down without waiting for a failed write.
            _ = &mut reader => {
                debug!(user_id, "notification client disconnected");
                break;
            }
        }
    }

    reader.abort();
}
