// src/server/ws.rs

//! Push channel: one WebSocket session per client.
//!
//! Frames are JSON `{event, data}` objects. A `scanRequest` starts a scan in
//! its own task; the session then pushes one `scanStatus` and one `scanResult`
//! for it, interleaved with events of any other scans the client started.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::ScanRequest;
use crate::core::observer::{ChannelObserver, ScanEvent};
use crate::core::scanner::Scanner;

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
enum ClientEvent {
    ScanRequest(ScanRequest),
}

pub async fn upgrade(ws: WebSocketUpgrade, State(scanner): State<Scanner>) -> Response {
    ws.on_upgrade(move |socket| session(socket, scanner))
}

async fn session(mut socket: WebSocket, scanner: Scanner) {
    info!("Client connected.");
    let (tx, mut rx) = mpsc::unbounded_channel::<ScanEvent>();

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => handle_frame(text.as_str(), &scanner, &tx),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => debug!("Ignoring non-text frame."),
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket receive failed.");
                    break;
                }
            },
            Some(event) = rx.recv() => {
                if !push(&mut socket, &event).await {
                    break;
                }
            }
        }
    }

    info!("Client disconnected.");
}

fn handle_frame(text: &str, scanner: &Scanner, tx: &UnboundedSender<ScanEvent>) {
    match parse_frame(text) {
        Ok(url) => {
            info!(url = %url, "Scan requested over WebSocket.");
            let scanner = scanner.clone();
            let observer = ChannelObserver::new(tx.clone());
            tokio::spawn(async move {
                scanner.scan(&url, &observer).await;
            });
        }
        Err(event) => {
            // The session loop owns the receiver, so this cannot fail here.
            let _ = tx.send(event);
        }
    }
}

/// Extracts the URL of a `scanRequest` frame, or the `error` event to answer with.
fn parse_frame(text: &str) -> Result<String, ScanEvent> {
    let event: ClientEvent = serde_json::from_str(text).map_err(|e| {
        debug!(error = %e, "Malformed client frame.");
        ScanEvent::Error { message: format!("Invalid message: {}", e) }
    })?;

    match event {
        ClientEvent::ScanRequest(request) => request
            .required_url()
            .map(str::to_string)
            .ok_or_else(|| ScanEvent::Error { message: "URL is required".to_string() }),
    }
}

async fn push(socket: &mut WebSocket, event: &ScanEvent) -> bool {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "Failed to serialize scan event.");
            return true;
        }
    };
    match socket.send(Message::Text(text.into())).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "WebSocket send failed.");
            false
        }
    }
}
