// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Cross-Service Aggregator
//!
//! Answers the writer's status query by combining the first line of a local
//! config file, the configured message, a fresh liveness record, and the
//! remote counter value. The reader's status combines a fresh record, the
//! remote counter value when a counter service is configured, and the most
//! recently tailed lines. Neither record is ever appended to the log.

use crate::errors::NodeError;
use crate::network::CounterClient;
use crate::tailer::RecentLines;
use logpong_core::EventRecord;
use std::path::PathBuf;
use std::sync::Arc;

async fn fetch_pings(client: &CounterClient) -> Result<String, NodeError> {
    client.get_pings().await.map_err(|e| {
        metrics::counter!("logpong_remote_failures_total", 1);
        e
    })
}

pub struct StatusAggregator {
    config_file: PathBuf,
    message: String,
    client: CounterClient,
}

impl StatusAggregator {
    pub fn new(config_file: impl Into<PathBuf>, message: impl Into<String>, client: CounterClient) -> Self {
        Self {
            config_file: config_file.into(),
            message: message.into(),
            client,
        }
    }

    /// Fails as a whole if the counter service cannot be queried.
    pub async fn on_status_query(&self) -> Result<String, NodeError> {
        let file_line = self.read_config_line().await?;
        let marker = EventRecord::now();

        let pings = fetch_pings(&self.client).await?;

        Ok(compose(&file_line, &self.message, &marker, &pings))
    }

    async fn read_config_line(&self) -> Result<String, NodeError> {
        let text = tokio::fs::read_to_string(&self.config_file).await?;
        Ok(text.lines().next().unwrap_or_default().to_string())
    }
}

fn compose(file_line: &str, message: &str, marker: &EventRecord, pings: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("file content: {}\n", file_line));
    out.push_str(&format!("env variable: MESSAGE={}\n", message));
    out.push_str(&format!("{}.\n", marker));
    out.push_str(&format!("Ping / Pongs : {}", pings));
    out
}

/// Status served by the reader role.
pub struct ReaderStatus {
    recent: Arc<RecentLines>,
    client: Option<CounterClient>,
}

impl ReaderStatus {
    pub fn new(recent: Arc<RecentLines>, client: Option<CounterClient>) -> Self {
        Self { recent, client }
    }

    /// With a counter service configured, fails as a whole if it cannot be queried.
    pub async fn on_status_query(&self) -> Result<String, NodeError> {
        let marker = EventRecord::now();
        let pings = match &self.client {
            Some(client) => Some(fetch_pings(client).await?),
            None => None,
        };
        Ok(compose_reader(
            &marker,
            pings.as_deref(),
            self.recent.total(),
            &self.recent.snapshot(),
        ))
    }
}

fn compose_reader(marker: &EventRecord, pings: Option<&str>, total: u64, lines: &[String]) -> String {
    let mut out = format!("{}.\n", marker);
    if let Some(pings) = pings {
        out.push_str(&format!("Ping / Pongs : {}\n", pings));
    }
    out.push_str(&format!("Lines tailed: {}\n", total));
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
