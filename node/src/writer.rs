// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Log Writer Loop
//!
//! Appends one fresh record to the shared log every interval. A failing
//! tick is logged and counted; the next tick still runs.

use logpong_core::{AppendLog, CoreResult, EventRecord};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// One writer tick: generate a record and append it.
pub fn run_writer_tick(log: &AppendLog) -> CoreResult<EventRecord> {
    let record = EventRecord::now();
    log.append(&record)?;
    Ok(record)
}

pub fn spawn_writer_loop(log: AppendLog, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        {
            let init_log = log.clone();
            match tokio::task::spawn_blocking(move || init_log.ensure_exists()).await {
                Ok(Ok(())) => tracing::info!("Writing to {:?} every {:?}", log.path(), period),
                Ok(Err(e)) => tracing::error!("Failed to create log {:?}: {}", log.path(), e),
                Err(e) => tracing::error!("Log creation task failed: {}", e),
            }
        }

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;

            let tick_log = log.clone();
            match tokio::task::spawn_blocking(move || run_writer_tick(&tick_log)).await {
                Ok(Ok(record)) => {
                    tracing::debug!("Appended {}", record);
                    metrics::counter!("logpong_lines_appended_total", 1);
                }
                Ok(Err(e)) => {
                    tracing::error!("Writer tick failed: {}", e);
                    metrics::counter!("logpong_writer_failures_total", 1);
                }
                Err(e) => {
                    tracing::error!("Writer tick panicked: {}", e);
                    metrics::counter!("logpong_writer_failures_total", 1);
                }
            }
        }
    })
}

/// Stdout ticker for the `now` role: prints a record per interval, no file.
pub fn spawn_stdout_loop(period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            println!("{}", EventRecord::now());
        }
    })
}
