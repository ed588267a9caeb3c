// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Incremental tailing of the append log.
//!
//! The [`Tailer`] owns a [`TailCursor`] and hands out at most `batch_size`
//! newly completed lines per [`Tailer::poll`]. Lines are never handed out
//! twice within one cursor lifetime. By default the cursor lives in memory
//! only and restarts at 0 with the process; a cursor file can be attached to
//! carry it across restarts. The file only moves on [`Tailer::commit`], which
//! callers run after the batch has been emitted, so a crash in between
//! redelivers the batch instead of losing it.

use crate::append_log::AppendLog;
use crate::atomic_file::write_atomic;
use crate::error::{CoreError, CoreResult};
use crate::record::{EventRecord, RecordError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Progress marker into the log.
///
/// `line` is the index of the next unread line; `offset` is the byte
/// position where that line starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailCursor {
    pub line: u64,
    pub offset: u64,
}

impl TailCursor {
    fn advanced(self, line_len: u64) -> Self {
        Self {
            line: self.line + 1,
            offset: self.offset + line_len,
        }
    }

    /// Load a persisted cursor. A missing file means "start from the beginning".
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read(path)?;
        if data.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(&data).map_err(|e| CoreError::CursorState(e.to_string()))
    }

    /// Persist via tmp file + rename so a crash never leaves half a cursor.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_vec(self).map_err(|e| CoreError::CursorState(e.to_string()))?;
        write_atomic(path, &json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailedLine {
    pub index: u64,
    pub raw: String,
    pub record: Result<EventRecord, RecordError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailBatch {
    pub lines: Vec<TailedLine>,
}

impl TailBatch {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn malformed(&self) -> usize {
        self.lines.iter().filter(|l| l.record.is_err()).count()
    }
}

pub struct Tailer {
    log: AppendLog,
    cursor: TailCursor,
    // Last cursor written to `cursor_path`.
    committed: TailCursor,
    batch_size: NonZeroUsize,
    cursor_path: Option<PathBuf>,
}

impl Tailer {
    pub fn new(log: AppendLog, batch_size: NonZeroUsize) -> Self {
        Self {
            log,
            cursor: TailCursor::default(),
            committed: TailCursor::default(),
            batch_size,
            cursor_path: None,
        }
    }

    /// Resume from (and keep writing to) a persisted cursor file.
    pub fn with_cursor_file(
        log: AppendLog,
        batch_size: NonZeroUsize,
        cursor_path: impl Into<PathBuf>,
    ) -> CoreResult<Self> {
        let cursor_path = cursor_path.into();
        let cursor = TailCursor::load(&cursor_path)?;
        Ok(Self {
            log,
            cursor,
            committed: cursor,
            batch_size,
            cursor_path: Some(cursor_path),
        })
    }

    pub fn cursor(&self) -> TailCursor {
        self.cursor
    }

    pub fn log(&self) -> &AppendLog {
        &self.log
    }

    /// One tailing pass. Advances the in-memory cursor only; see [`Tailer::commit`].
    ///
    /// Malformed lines are returned as errors inside the batch and still
    /// consumed.
    pub fn poll(&mut self) -> CoreResult<TailBatch> {
        self.log.ensure_exists()?;
        let raw = self
            .log
            .read_lines_from(self.cursor.offset, self.batch_size.get())?;

        let mut next = self.cursor;
        let mut lines = Vec::with_capacity(raw.len());
        for line in raw {
            let record = EventRecord::decode(&line.text);
            lines.push(TailedLine {
                index: next.line,
                raw: line.text,
                record,
            });
            next = next.advanced(line.len);
        }

        self.cursor = next;
        Ok(TailBatch { lines })
    }

    /// Write the in-memory cursor to the cursor file, if one is attached and
    /// it moved. A failed commit is retried by the next one.
    pub fn commit(&mut self) -> CoreResult<()> {
        if self.cursor == self.committed {
            return Ok(());
        }
        if let Some(path) = &self.cursor_path {
            self.cursor.save(path)?;
        }
        self.committed = self.cursor;
        Ok(())
    }
}
