use std::fs;
use std::path::Path;

use tracing::debug;
use tracing::error;

/// Shifts existing files one generation back, newest first in `file_names`.
///
/// `dir/file_names[i-1]` is renamed to `dir/file_names[i]` from the oldest
/// slot down, so the oldest generation is overwritten and slot 0 is left free
/// for fresh content. Missing files are skipped; failed renames are logged
/// and otherwise ignored.
pub fn backup_files<S: AsRef<str>>(
    dir: &Path,
    file_names: &[S],
) {
    for i in (1..file_names.len()).rev() {
        let newer = dir.join(file_names[i - 1].as_ref());
        let older = dir.join(file_names[i].as_ref());
        if !newer.exists() {
            continue;
        }
        match fs::rename(&newer, &older) {
            Ok(()) => debug!("Rotated {} to {}", newer.display(), older.display()),
            Err(e) => error!(
                old_name = %older.display(),
                new_name = %newer.display(),
                "Unable to rename configuration files: {}",
                e
            ),
        }
    }
}
