// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::aggregator::{ReaderStatus, StatusAggregator};
use crate::api::MessageResponse;
use crate::errors::NodeError;
use crate::ping::PingService;
use logpong_core::EventRecord;

/// Per-role state behind the HTTP facade.
#[derive(Clone)]
pub enum RoleState {
    Now,
    Writer(Arc<StatusAggregator>),
    Reader(Arc<ReaderStatus>),
    PingPong(PingService),
}

pub fn build_router(state: RoleState) -> Router {
    let common = Router::new()
        .route("/now", get(now))
        .route("/health-check", get(health_check))
        .route("/metrics", get(metrics_handler));

    let role_routes: Router = match state {
        RoleState::Now => Router::new(),
        RoleState::Writer(aggregator) => Router::new()
            .route("/now/writer", get(now_writer))
            .with_state(aggregator),
        RoleState::Reader(status) => Router::new()
            .route("/now/reader", get(now_reader))
            .with_state(status),
        RoleState::PingPong(service) => Router::new()
            .route("/pingpong", get(pingpong))
            .route("/get_pings", get(get_pings))
            .with_state(service),
    };

    common.merge(role_routes).layer(TraceLayer::new_for_http())
}

async fn now() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: EventRecord::now().encode(),
    })
}

async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "OK".to_string(),
    })
}

async fn now_writer(
    State(aggregator): State<Arc<StatusAggregator>>,
) -> Result<String, NodeError> {
    aggregator.on_status_query().await
}

async fn now_reader(State(status): State<Arc<ReaderStatus>>) -> Result<String, NodeError> {
    status.on_status_query().await
}

async fn pingpong(State(service): State<PingService>) -> Result<String, NodeError> {
    service.on_ping().await
}

async fn get_pings(State(service): State<PingService>) -> Result<String, NodeError> {
    service.on_get_count()
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
