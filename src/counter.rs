// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Persistent Counter Store
//!
//! A single non-negative integer kept as plain text in its own file.
//! Every mutation is on disk before it is acknowledged: the new value is
//! written to a sibling tmp file, fsync'd, and renamed over the target.

use crate::atomic_file::write_atomic;
use crate::error::{CoreError, CoreResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// What to do with a value left over from a previous process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartupPolicy {
    /// Overwrite storage with 0.
    #[default]
    Reset,
    /// Keep counting from the persisted value.
    Resume,
}

pub struct CounterStore {
    path: PathBuf,
    // Mirror of the persisted value. Holding the guard is the critical
    // section for read-modify-persist.
    value: Mutex<u64>,
}

impl CounterStore {
    pub fn open(path: impl AsRef<Path>, policy: StartupPolicy) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            path,
            value: Mutex::new(0),
        };
        match policy {
            StartupPolicy::Reset => store.reset(0)?,
            StartupPolicy::Resume => {
                let persisted = load_persisted(&store.path)?;
                store.reset(persisted)?;
            }
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, add one, persist, then return the new value.
    pub fn increment(&self) -> CoreResult<u64> {
        let mut guard = self.value.lock().map_err(|_| CoreError::LockPoisoned)?;
        let current = load_persisted(&self.path)?;
        let next = current.checked_add(1).ok_or(CoreError::CounterOverflow)?;
        persist(&self.path, next)?;
        *guard = next;
        Ok(next)
    }

    /// Last value persisted by this process.
    pub fn read(&self) -> CoreResult<u64> {
        let guard = self.value.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(*guard)
    }

    pub fn reset(&self, value: u64) -> CoreResult<()> {
        let mut guard = self.value.lock().map_err(|_| CoreError::LockPoisoned)?;
        persist(&self.path, value)?;
        *guard = value;
        Ok(())
    }
}

/// Value currently on disk; 0 when the file is absent or empty.
pub fn load_persisted(path: &Path) -> CoreResult<u64> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| CoreError::CorruptCounter(trimmed.to_string()))
}

fn persist(path: &Path, value: u64) -> CoreResult<()> {
    write_atomic(path, value.to_string().as_bytes())
}
