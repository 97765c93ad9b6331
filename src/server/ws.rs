use crate::errors::EngineError;
use crate::state::{AppState, EngineEvent, ParameterUpdate, WsMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use portable_atomic::Ordering;
use std::sync::Arc;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.ws_tx.subscribe();

    // Send current evaluation so a fresh dashboard renders immediately
    {
        let snapshot = state.snapshot_rx.borrow().clone();
        let msg = WsMessage::Evaluation(Box::new(snapshot));
        if let Ok(json) = serde_json::to_string(&msg) {
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
    }

    // Forward broadcast messages to this client
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ws_msg) => match serde_json::to_string(&ws_msg) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                },
                // Slow client: older evaluations are superseded anyway
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!(skipped = n, "ws client lagged");
                    continue;
                }
                Err(_) => break,
            }
        }
    });

    // Client messages are parameter updates for the engine
    let engine_tx = state.engine_tx.clone();
    let recv_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match parse_update(text.as_str()) {
                        Ok(update) => {
                            if engine_tx.send(EngineEvent::ParametersChanged(update)).await.is_err() {
                                tracing::warn!("engine channel closed");
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "bad ws message");
                            recv_state.counters.inputs_rejected.fetch_add(1, Ordering::Relaxed);
                            recv_state.broadcast(WsMessage::ValidationError {
                                field: None,
                                message: e.to_string(),
                            });
                        }
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish (client disconnected)
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

fn parse_update(text: &str) -> Result<ParameterUpdate, EngineError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sensitivity;

    #[test]
    fn test_parse_partial_update() {
        let update = parse_update(r#"{"sigma": 0.35, "sensitivity": "delta_call"}"#).unwrap();
        assert_eq!(update.volatility, Some(0.35));
        assert_eq!(update.sensitivity, Some(Sensitivity::DeltaCall));
        assert_eq!(update.spot, None);
    }

    #[test]
    fn test_parse_garbage_is_parse_error() {
        let err = parse_update("spot=100").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
