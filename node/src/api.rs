// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

/// `{"message": ...}` body used by `/now` and `/health-check`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
