// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! logpong-core: the append-only event log, its tailer, and the persistent counter
//! shared by the logpong services.

mod atomic_file;
pub mod error;
pub mod record;
pub mod append_log;
pub mod tail;
pub mod counter;

pub use append_log::AppendLog;
pub use counter::{CounterStore, StartupPolicy};
pub use error::{CoreError, CoreResult};
pub use record::{EventRecord, RecordError};
pub use tail::{TailBatch, TailCursor, TailedLine, Tailer};
