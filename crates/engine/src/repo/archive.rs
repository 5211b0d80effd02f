/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{PackagerError, PackagerResult};

/// Extract a zip archive into `dest` and return its single top-level directory.
///
/// This blocks; run it off the async executor.
///
/// # Errors
///
/// Returns `MalformedArchive` if the bytes are not a zip archive or the archive
/// does not hold exactly one top-level directory.
pub fn extract_single_root(bytes: &[u8], dest: &Path) -> PackagerResult<PathBuf> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PackagerError::MalformedArchive(format!("not a zip archive: {e}")))?;

    archive.extract(dest).map_err(|e| match e {
        ZipError::Io(io) => PackagerError::Io(io),
        other => PackagerError::MalformedArchive(other.to_string()),
    })?;

    let entries = fs::read_dir(dest)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;

    match entries.as_slice() {
        [root] if root.is_dir() => Ok(root.clone()),
        [root] => Err(PackagerError::MalformedArchive(format!(
            "top-level entry {} is not a directory",
            root.display()
        ))),
        [] => Err(PackagerError::MalformedArchive(
            "archive has no top-level entry".to_string(),
        )),
        _ => Err(PackagerError::MalformedArchive(format!(
            "expected one top-level entry, found {}",
            entries.len()
        ))),
    }
}
