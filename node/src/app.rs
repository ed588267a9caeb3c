// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Wires one role's core objects, background task and router together.

use crate::aggregator::{ReaderStatus, StatusAggregator};
use crate::config::{ConfigError, NodeConfig, Role};
use crate::errors::NodeError;
use crate::network::CounterClient;
use crate::ping::PingService;
use crate::server::{build_router, RoleState};
use crate::tailer::{spawn_tail_loop, RecentLines};
use crate::writer::{spawn_stdout_loop, spawn_writer_loop};
use axum::Router;
use logpong_core::{AppendLog, CounterStore, Tailer};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct App {
    pub router: Router,
    /// Periodic task for the role, if it has one. Runs until the process exits.
    pub background: Option<JoinHandle<()>>,
}

impl App {
    /// Must be called inside a tokio runtime; background loops start immediately.
    pub fn from_config(cfg: &NodeConfig) -> Result<Self, NodeError> {
        let (state, background) = match cfg.role {
            Role::Now => (RoleState::Now, Some(spawn_stdout_loop(cfg.write_interval))),
            Role::Writer => {
                let peer = cfg
                    .counter_service
                    .as_ref()
                    .ok_or(ConfigError::Missing("COUNTER_SERVICE_HOST"))?;
                let message = cfg.message.clone().ok_or(ConfigError::Missing("MESSAGE"))?;
                let client = CounterClient::from_config(peer)?;
                tracing::info!("Counter service at {}", client.base_url());

                let aggregator = StatusAggregator::new(cfg.config_file().to_path_buf(), message, client);
                let handle = spawn_writer_loop(AppendLog::new(cfg.log_path()), cfg.write_interval);
                (RoleState::Writer(Arc::new(aggregator)), Some(handle))
            }
            Role::Reader => {
                let log = AppendLog::new(cfg.log_path());
                let tailer = match &cfg.tail_cursor_file {
                    Some(path) => {
                        let tailer = Tailer::with_cursor_file(log, cfg.tail_batch_size, path)?;
                        tracing::info!("Resuming tail at line {} from {:?}", tailer.cursor().line, path);
                        tailer
                    }
                    None => Tailer::new(log, cfg.tail_batch_size),
                };
                let client = cfg
                    .counter_service
                    .as_ref()
                    .map(CounterClient::from_config)
                    .transpose()?;
                if let Some(client) = &client {
                    tracing::info!("Counter service at {}", client.base_url());
                }
                let recent = Arc::new(RecentLines::new(cfg.recent_lines));
                let handle = spawn_tail_loop(tailer, recent.clone(), cfg.tail_interval);
                (RoleState::Reader(Arc::new(ReaderStatus::new(recent, client))), Some(handle))
            }
            Role::PingPong => {
                let store = CounterStore::open(cfg.counter_path(), cfg.counter_on_start)?;
                tracing::info!(
                    "Counter at {:?} starts from {} ({:?})",
                    store.path(),
                    store.read()?,
                    cfg.counter_on_start
                );
                (RoleState::PingPong(PingService::new(Arc::new(store))), None)
            }
        };

        Ok(Self {
            router: build_router(state),
            background,
        })
    }
}

/// Build the role and serve it on `cfg.bind_addr` until the process exits.
pub async fn run(cfg: NodeConfig) -> Result<(), NodeError> {
    let app = App::from_config(&cfg)?;

    let listener = TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!("{:?} listening on {}", cfg.role, cfg.bind_addr);
    axum::serve(listener, app.router).await?;
    Ok(())
}
