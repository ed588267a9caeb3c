// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::OnceLock;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Initialize Tracing (Logs)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "logpong_node=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Initialize Metrics (Prometheus)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::error!("Failed to install Prometheus recorder: {}", e),
    }

    metrics::describe_counter!("logpong_lines_appended_total", "Records appended to the shared log");
    metrics::describe_counter!("logpong_writer_failures_total", "Writer ticks that failed");
    metrics::describe_counter!("logpong_lines_tailed_total", "Complete lines consumed by the tailer");
    metrics::describe_counter!("logpong_malformed_lines_total", "Tailed lines that failed to decode");
    metrics::describe_counter!("logpong_tail_failures_total", "Tail ticks that failed");
    metrics::describe_counter!("logpong_pings_total", "Accepted counter increments");
    metrics::describe_counter!("logpong_remote_failures_total", "Failed queries to the counter service");

    metrics::gauge!("logpong_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
