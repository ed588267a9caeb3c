// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! EventRecord line codec
//!
//! One record per line:
//! ```text
//! 2025-03-01T12:00:05.123Z: 0f8fad5b-d9cb-469f-a165-70867728950e
//! ```
//! The timestamp is UTC with millisecond precision and a `Z` designator,
//! the token a random UUID in hyphenated form. The first `": "` separates them.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub const SEPARATOR: &str = ": ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing \": \" separator in {0:?}")]
    MissingSeparator(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("invalid token {0:?}")]
    InvalidToken(String),
}

/// A single timestamped line of the append log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventRecord {
    timestamp: DateTime<Utc>,
    token: Uuid,
}

impl EventRecord {
    /// Timestamps are truncated to whole milliseconds so that the encoded
    /// line carries the full value.
    pub fn new(timestamp: DateTime<Utc>, token: Uuid) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            token,
        }
    }

    /// Current UTC instant plus a fresh random token.
    pub fn now() -> Self {
        Self::new(Utc::now(), Uuid::new_v4())
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn encode(&self) -> String {
        encode(self.timestamp, self.token)
    }

    pub fn decode(line: &str) -> Result<Self, RecordError> {
        decode(line)
    }
}

/// Renders `"<timestamp>: <token>"`. UTC is always written as `Z`, never `+00:00`.
pub fn encode(timestamp: DateTime<Utc>, token: Uuid) -> String {
    format!(
        "{}{}{}",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        SEPARATOR,
        token.hyphenated()
    )
}

pub fn decode(line: &str) -> Result<EventRecord, RecordError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let (ts, token) = line
        .split_once(SEPARATOR)
        .ok_or_else(|| RecordError::MissingSeparator(line.to_string()))?;

    let timestamp = DateTime::parse_from_rfc3339(ts)
        .map_err(|_| RecordError::InvalidTimestamp(ts.to_string()))?
        .with_timezone(&Utc);
    let token = Uuid::parse_str(token).map_err(|_| RecordError::InvalidToken(token.to_string()))?;

    Ok(EventRecord { timestamp, token })
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for EventRecord {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}
