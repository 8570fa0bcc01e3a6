use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

// Second granularity keeps names unique as long as no two records are
// created with the same title within the same second.
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Derives the document folder name for a job application: the position
/// title with path separators flattened to `_`, plus a creation stamp.
/// The result is always a single path segment.
pub fn folder_name(position: &str, at: DateTime<Local>) -> String {
    let safe: String = position
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{safe}_{}", at.format(STAMP_FORMAT))
}

/// Copies `source` into the record's folder, preserving the original file
/// name. The folder is recreated if it was removed externally; a name
/// collision silently overwrites.
pub fn upload(folder: &Path, source: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(folder)?;
    let name = source
        .file_name()
        .ok_or_else(|| io::Error::other("source has no file name"))?;
    let dest = folder.join(name);
    fs::copy(source, &dest)?;
    Ok(dest)
}

/// Lists the files in the record's folder. A missing folder is an error
/// the shell reports to the user.
pub fn documents(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Best-effort recursive removal. A missing folder is a no-op; failures are
/// logged and swallowed so the caller's row deletion proceeds regardless.
pub fn remove_folder(folder: &Path) {
    if !folder.exists() {
        return;
    }
    if let Err(err) = fs::remove_dir_all(folder) {
        log::warn!(
            "failed to remove document folder path={} err={err}",
            folder.display()
        );
    }
}
