// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Durable Append Log
//!
//! A plain text file of newline-terminated [`EventRecord`] lines.
//! - One writer process appends; any number of readers poll.
//! - Every record is written with a single `write_all` of the complete
//!   line and `sync_data`'d before `append` returns.
//! - Readers only hand out lines that end in `\n`; a trailing fragment is
//!   left for a later read.
//! - The file is never truncated or rewritten.

use crate::error::{CoreError, CoreResult};
use crate::record::{EventRecord, RecordError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A complete line read from the log, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub text: String,
    /// Bytes occupied in the file, terminator included.
    pub len: u64,
}

#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log empty if it does not exist yet. An existing log is
    /// left alone and needs no write access.
    pub fn ensure_exists(&self) -> CoreResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }

    /// Append one record as a single newline-terminated write.
    pub fn append(&self, record: &EventRecord) -> CoreResult<()> {
        let mut line = record.encode();
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        Ok(())
    }

    /// Read up to `max_lines` complete lines starting at byte `offset`.
    ///
    /// `offset` must sit on a line boundary. Stops early at EOF or at a
    /// fragment that has no terminator yet.
    pub fn read_lines_from(&self, offset: u64, max_lines: usize) -> CoreResult<Vec<RawLine>> {
        let mut file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        if file_len < offset {
            return Err(CoreError::LogTruncated {
                expected: offset,
                found: file_len,
            });
        }
        file.seek(SeekFrom::Start(offset))?;

        let mut reader = BufReader::new(file);
        let mut lines = Vec::new();
        let mut buf = Vec::new();

        while lines.len() < max_lines {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 || buf.last() != Some(&b'\n') {
                break;
            }
            let body = &buf[..n - 1];
            let body = body.strip_suffix(b"\r").unwrap_or(body);
            lines.push(RawLine {
                text: String::from_utf8_lossy(body).into_owned(),
                len: n as u64,
            });
        }

        Ok(lines)
    }

    /// Decode every complete line currently in the log.
    pub fn read_all(&self) -> CoreResult<Vec<Result<EventRecord, RecordError>>> {
        let lines = self.read_lines_from(0, usize::MAX)?;
        Ok(lines.iter().map(|l| EventRecord::decode(&l.text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_exists_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("files").join("timestamp.txt");

        let log = AppendLog::new(&path);
        log.ensure_exists().unwrap();

        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_ensure_exists_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamp.txt");
        let log = AppendLog::new(&path);

        log.append(&EventRecord::now()).unwrap();
        let before = fs::metadata(&path).unwrap().len();
        log.ensure_exists().unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), before);
    }

    #[test]
    fn test_read_stops_at_unterminated_fragment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamp.txt");
        let log = AppendLog::new(&path);

        let first = EventRecord::now();
        log.append(&first).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"2025-01-01T00:00:00.000Z: 0f8f").unwrap();

        let lines = log.read_lines_from(0, 10).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, first.encode());
        assert_eq!(lines[0].len, first.encode().len() as u64 + 1);
    }

    #[test]
    fn test_read_past_end_is_truncation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timestamp.txt");
        let log = AppendLog::new(&path);
        log.ensure_exists().unwrap();

        match log.read_lines_from(10, 1) {
            Err(CoreError::LogTruncated { expected: 10, found: 0 }) => (),
            other => panic!("Expected LogTruncated, got {:?}", other),
        }
    }
}
