//! Idempotent filesystem mutations
//!
//! The two file-writing assertion kinds bottom out here:
//!
//! - marker-guarded block insertion into a text file (append-once: the
//!   marker's presence is the idempotence check),
//! - whole-file creation with content and mode (created only if absent; an
//!   existing file is never clobbered).
//!
//! Both return whether they mutated anything so the executor can record
//! `Applied` vs `AlreadySatisfied`.

use crate::error::Result;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Returns true if `path` exists and already contains `marker`.
///
/// Read-only; used as the idempotence check for block insertion.
pub fn block_present(path: &Path, marker: &str) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let content = fs::read_to_string(path)?;
    Ok(content.contains(marker))
}

/// Append a marker-guarded block to `path` unless the marker is present.
///
/// The block is framed by begin/end marker lines so a later run (or a human)
/// can find it. Returns `true` if the file was modified.
pub fn ensure_block(path: &Path, marker: &str, block: &str) -> Result<bool> {
    if block_present(path, marker)? {
        debug!("Block '{}' already present in {}", marker, path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;

    // Leading newline separates the block from whatever the file ends with
    writeln!(file, "\n# >>> {} >>>", marker)?;
    writeln!(file, "{}", block.trim_end())?;
    writeln!(file, "# <<< {} <<<", marker)?;

    info!("Inserted block '{}' into {}", marker, path.display());
    Ok(true)
}

/// Create `path` with `content` and `mode` only if it does not exist.
///
/// Returns `true` if the file was created. Parent directories are created
/// as needed; an existing file is left untouched.
pub fn write_if_absent(path: &Path, content: &str, mode: u32) -> Result<bool> {
    if path.exists() {
        debug!("File {} already exists, leaving untouched", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;

    info!("Created {} (mode {:o})", path.display(), mode);
    Ok(true)
}
