// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Whole-file replacement: write a sibling tmp file, fsync, rename over the target.

use crate::error::CoreResult;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `<file name>.tmp` next to `path`, so targets sharing a stem never share a tmp file.
pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let tmp = tmp_path(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(tmp, path)?;
    Ok(())
}
