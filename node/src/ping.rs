// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Counter Service: increment and read over the persistent counter.

use crate::errors::NodeError;
use logpong_core::CounterStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct PingService {
    store: Arc<CounterStore>,
}

impl PingService {
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    /// Persist one increment and answer `"Pong <n>"`.
    pub async fn on_ping(&self) -> Result<String, NodeError> {
        let store = self.store.clone();
        let value = tokio::task::spawn_blocking(move || store.increment())
            .await
            .map_err(|_| NodeError::Internal)??;

        metrics::counter!("logpong_pings_total", 1);
        tracing::debug!("Ping accepted, counter at {}", value);
        Ok(format!("Pong {}", value))
    }

    pub fn on_get_count(&self) -> Result<String, NodeError> {
        Ok(self.store.read()?.to_string())
    }
}
