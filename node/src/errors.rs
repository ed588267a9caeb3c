// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use logpong_core::CoreError;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// The counter service could not be reached or answered with an error.
    #[error("Remote counter service error: {0}")]
    Remote(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status = match &self {
            NodeError::Remote(_) => StatusCode::BAD_GATEWAY,
            NodeError::Core(_)
            | NodeError::Storage(_)
            | NodeError::Config(_)
            | NodeError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("Request failed: {}", self);

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
