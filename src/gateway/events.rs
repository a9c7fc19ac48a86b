//! Session event stream over WebSocket.
//!
//! All sessions share one outbound stream; every connected client receives
//! every event and demultiplexes by session id. The dispatcher task bridges
//! the registry's mpsc channel onto a broadcast channel so clients can
//! attach and detach freely.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use super::handlers::AppState;
use super::types::WsEvent;
use crate::session::SessionEvent;

/// Fan registry events out to all WebSocket subscribers.
///
/// Events for ids nobody is watching (including sessions already removed
/// from the registry) are forwarded or dropped without error; the send
/// result is ignored because zero subscribers is a normal state.
pub(crate) async fn dispatch_events(
    mut rx: mpsc::Receiver<SessionEvent>,
    tx: broadcast::Sender<SessionEvent>,
) {
    while let Some(event) = rx.recv().await {
        let _ = tx.send(event);
    }
    debug!("event dispatcher: registry channel closed");
}

/// WebSocket upgrade handler for the shared event stream.
pub async fn ws_events_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, rx))
}

/// Pump broadcast events to one client until either side goes away.
async fn stream_events(socket: WebSocket, mut rx: broadcast::Receiver<SessionEvent>) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let ws_event = WsEvent::from(&event);
                        let Ok(json) = serde_json::to_string(&ws_event) else {
                            continue;
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("event stream client lagged, {} events dropped", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(_)) => {
                        // The event stream is outbound-only; client text is ignored.
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ExitStatus;
    use crate::session::SessionId;
    use std::time::Duration;

    #[tokio::test]
    async fn test_dispatcher_forwards_to_subscribers() {
        let (mpsc_tx, mpsc_rx) = mpsc::channel(16);
        let (broadcast_tx, mut broadcast_rx) = broadcast::channel(16);

        tokio::spawn(dispatch_events(mpsc_rx, broadcast_tx));

        let id = SessionId::from("term-1-0001");
        mpsc_tx
            .send(SessionEvent::Data {
                id: id.clone(),
                bytes: b"hi".to_vec(),
            })
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), broadcast_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.session_id(), &id);
    }

    #[tokio::test]
    async fn test_dispatcher_tolerates_no_subscribers() {
        let (mpsc_tx, mpsc_rx) = mpsc::channel(16);
        let (broadcast_tx, _) = broadcast::channel(16);

        let dispatcher = tokio::spawn(dispatch_events(mpsc_rx, broadcast_tx));

        // An exit event for a session nobody watches must be a no-op.
        mpsc_tx
            .send(SessionEvent::Exit {
                id: SessionId::from("term-gone-0001"),
                status: ExitStatus::default(),
            })
            .await
            .unwrap();

        drop(mpsc_tx);
        let finished = tokio::time::timeout(Duration::from_secs(1), dispatcher).await;
        assert!(finished.is_ok());
    }
}
