// src/core/store.rs

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::core::models::ScanResult;

/// In-memory cache of the latest result per URL string.
///
/// Created once at startup and shared behind an `Arc` for the lifetime of the
/// process. Keys are compared as exact strings, so `https://a.com` and
/// `https://a.com/` are different entries. Racing writes for the same key are
/// last-write-wins.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: RwLock<HashMap<String, ScanResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` under its own `url`, replacing any earlier entry.
    pub async fn insert(&self, result: ScanResult) {
        let mut results = self.results.write().await;
        if results.insert(result.url.clone(), result).is_some() {
            debug!("Replaced previous result in store.");
        }
    }

    pub async fn get(&self, url: &str) -> Option<ScanResult> {
        self.results.read().await.get(url).cloned()
    }

    /// Snapshot of every stored result, in no particular order.
    pub async fn all(&self) -> Vec<ScanResult> {
        self.results.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}
