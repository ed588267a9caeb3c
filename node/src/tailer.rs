// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Log Tail Loop
//!
//! Polls the shared log on a fixed period and emits every newly completed
//! line to stdout and to a bounded [`RecentLines`] buffer read by `/now/reader`.

use logpong_core::{CoreResult, Tailer};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Most recent tailed lines, oldest first.
pub struct RecentLines {
    lines: RwLock<VecDeque<String>>,
    capacity: usize,
    total: AtomicU64,
}

impl RecentLines {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: RwLock::new(VecDeque::new()),
            capacity,
            total: AtomicU64::new(0),
        }
    }

    pub fn push(&self, line: String) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if self.capacity == 0 {
            return;
        }
        let mut guard = self.lines.write().unwrap_or_else(|e| e.into_inner());
        if guard.len() == self.capacity {
            guard.pop_front();
        }
        guard.push_back(line);
    }

    pub fn snapshot(&self) -> Vec<String> {
        let guard = self.lines.read().unwrap_or_else(|e| e.into_inner());
        guard.iter().cloned().collect()
    }

    /// Lines emitted since startup, including ones evicted from the buffer.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// One tail tick. Returns the number of lines consumed, malformed ones included.
///
/// The cursor is committed only after every line has been emitted.
pub fn run_tail_tick(tailer: &mut Tailer, recent: &RecentLines) -> CoreResult<usize> {
    let batch = tailer.poll()?;
    for line in &batch.lines {
        match &line.record {
            Ok(_) => {
                println!("{}", line.raw);
                recent.push(line.raw.clone());
            }
            Err(e) => {
                tracing::warn!("Skipping malformed line {}: {}", line.index, e);
                metrics::counter!("logpong_malformed_lines_total", 1);
            }
        }
    }
    metrics::counter!("logpong_lines_tailed_total", batch.len() as u64);
    tailer.commit()?;
    Ok(batch.len())
}

pub fn spawn_tail_loop(tailer: Tailer, recent: Arc<RecentLines>, period: Duration) -> JoinHandle<()> {
    tracing::info!("Tailing {:?} every {:?}", tailer.log().path(), period);
    let tailer = Arc::new(Mutex::new(tailer));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;

            let tailer = tailer.clone();
            let recent = recent.clone();
            let res = tokio::task::spawn_blocking(move || {
                let mut guard = tailer.lock().unwrap_or_else(|e| e.into_inner());
                run_tail_tick(&mut guard, &recent)
            })
            .await;

            match res {
                Ok(Ok(0)) => {}
                Ok(Ok(n)) => tracing::debug!("Tailed {} lines", n),
                Ok(Err(e)) => {
                    tracing::error!("Tail tick failed: {}", e);
                    metrics::counter!("logpong_tail_failures_total", 1);
                }
                Err(e) => {
                    tracing::error!("Tail tick panicked: {}", e);
                    metrics::counter!("logpong_tail_failures_total", 1);
                }
            }
        }
    })
}
