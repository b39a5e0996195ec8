//! Working-directory preparation run at the start of every boot.
//!
//! The scratch directory is wiped and the bundled default files are merged
//! into the working file root. Files already present in the root that have no
//! counterpart in the defaults are left alone.

use crate::errors::{Error, Result};
use chrono_tz::Tz;
use std::{fs, path::Path};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Resolves an IANA timezone name.
///
/// Unknown names are not fatal: a warning is logged and UTC is used instead.
#[must_use]
pub fn configure_timezone(name: &str) -> Tz {
    match name.parse::<Tz>() {
        Ok(tz) => {
            info!("Using timezone {}", tz);
            tz
        }
        Err(e) => {
            warn!("Unknown timezone '{}' ({}), falling back to UTC", name, e);
            Tz::UTC
        }
    }
}

/// Removes the scratch directory and everything in it, if it exists.
///
/// Returns whether anything was removed.
#[instrument]
pub fn reset_scratch_dir(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        debug!("No scratch directory to remove");
        return Ok(false);
    }
    fs::remove_dir_all(path)?;
    info!("Removed scratch directory");
    Ok(true)
}

/// Copies the `source` tree into `destination`, overwriting files that exist in both.
///
/// Directories are created as needed. Returns the number of files copied.
#[instrument]
pub fn copy_default_files(source: &Path, destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)?;
    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry.path().strip_prefix(source).map_err(|e| Error::Config {
            message: format!("Default file outside of {}: {e}", source.display()),
        })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    info!("Copied {} default files", copied);
    Ok(copied)
}
