//! Scratch directory housekeeping

use std::path::Path;

use tracing::{debug, warn};

/// Remove the scratch directory if it exists. Failures are only logged.
pub fn clean_temp_dir(path: &Path) {
    if !path.exists() {
        return;
    }
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!("Removed temp directory {}", path.display()),
        Err(e) => warn!("Failed to remove temp directory {}: {}", path.display(), e),
    }
}
