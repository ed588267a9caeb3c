// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::CounterServiceConfig;
use crate::errors::NodeError;
use reqwest::Client;
use std::time::Duration;

/// HTTP client for a remote counter service.
#[derive(Debug, Clone)]
pub struct CounterClient {
    base_url: String,
    client: Client,
}

impl CounterClient {
    /// Every request is bounded by `timeout`, connect included.
    pub fn new(url: String, timeout: Duration) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| NodeError::Remote(e.to_string()))?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(cfg: &CounterServiceConfig) -> Result<Self, NodeError> {
        Self::new(cfg.base_url(), cfg.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current counter value as the remote renders it. No retries.
    pub async fn get_pings(&self) -> Result<String, NodeError> {
        let url = format!("{}/get_pings", self.base_url);
        let resp = self.client.get(&url).send().await
            .map_err(|e| NodeError::Remote(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NodeError::Remote(format!("Counter request failed: {}", resp.status())));
        }

        resp.text().await.map_err(|e| NodeError::Remote(e.to_string()))
    }
}
