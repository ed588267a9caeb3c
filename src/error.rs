// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use crate::record::RecordError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record: {0}")]
    Malformed(#[from] RecordError),
    /// Counter file holds something other than a non-negative integer.
    #[error("Counter file corrupted: {0:?}")]
    CorruptCounter(String),
    #[error("Counter overflow")]
    CounterOverflow,
    /// The log is shorter than bytes already consumed; append-only was violated.
    #[error("Log truncated: cursor at byte {expected}, file has {found} bytes")]
    LogTruncated { expected: u64, found: u64 },
    #[error("Lock poisoned")]
    LockPoisoned,
    #[error("Invalid cursor state: {0}")]
    CursorState(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
