// src/core/observer.rs

//! Delivery of scan progress to whoever triggered the scan.
//!
//! HTTP handlers get the result as a return value and plug in `SilentObserver`.
//! WebSocket sessions and the dashboard plug in a `ChannelObserver` and read
//! `ScanEvent`s from the other end of the channel.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::core::models::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanStatus {
    Scanning,
}

/// Receives the status and the final result of a scan.
pub trait ScanObserver: Send + Sync {
    fn notify_status(&self, status: ScanStatus, url: &str);
    fn notify_result(&self, result: &ScanResult);
}

/// Observer for callers that only need the returned `ScanResult`.
pub struct SilentObserver;

impl ScanObserver for SilentObserver {
    fn notify_status(&self, _status: ScanStatus, _url: &str) {}
    fn notify_result(&self, _result: &ScanResult) {}
}

/// Events pushed to a live client, serialized as `{event, data}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ScanEvent {
    ScanStatus { status: ScanStatus, url: String },
    ScanResult(ScanResult),
    Error { message: String },
}

/// Forwards every notification into an unbounded channel.
#[derive(Clone)]
pub struct ChannelObserver {
    tx: UnboundedSender<ScanEvent>,
}

impl ChannelObserver {
    pub fn new(tx: UnboundedSender<ScanEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: ScanEvent) {
        // The receiver is gone when the client disconnected mid-scan.
        if self.tx.send(event).is_err() {
            debug!("Scan event dropped, receiver closed.");
        }
    }
}

impl ScanObserver for ChannelObserver {
    fn notify_status(&self, status: ScanStatus, url: &str) {
        self.send(ScanEvent::ScanStatus { status, url: url.to_string() });
    }

    fn notify_result(&self, result: &ScanResult) {
        self.send(ScanEvent::ScanResult(result.clone()));
    }
}
