//! Capture merging.
//!
//! Concatenates the artifacts an engine run left in the sandbox into a single
//! output stream.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Order in which capture artifacts are concatenated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeOrder {
    /// Sorted by file name (byte-wise).
    #[default]
    Name,
    /// Whatever order the filesystem lists entries in.
    Listing,
}

/// Write every file in `dir` except `exclude` into `sink`.
///
/// The directory is listed once. Non-file entries are skipped. A read or write
/// failure stops the merge; bytes already written stay written. Returns the
/// number of artifacts merged.
pub fn merge_captures<W: Write + ?Sized>(
    dir: &Path,
    exclude: &str,
    order: MergeOrder,
    sink: &mut W,
) -> Result<usize> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if entry.file_name() == exclude {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if !file_type.is_file() {
            tracing::debug!(path = %entry.path().display(), "Skipping non-file capture entry");
            continue;
        }
        artifacts.push(entry);
    }

    if order == MergeOrder::Name {
        artifacts.sort_by_key(fs::DirEntry::file_name);
    }

    for entry in &artifacts {
        let path = entry.path();
        let content = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        sink.write_all(&content).map_err(Error::Output)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Merged capture");
    }

    Ok(artifacts.len())
}
