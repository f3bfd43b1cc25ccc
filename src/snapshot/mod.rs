//! Persisted configuration snapshots and drift detection.
//!
//! After [`DaemonConfig::store_in_file`] the configuration's checksum is
//! remembered; [`DaemonConfig::validate_unchanged`] later reports any change
//! to non-volatile fields with a diff against the persisted copy.

mod backup;
mod diff;
pub use backup::*;
pub use diff::*;


//---
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use config::Config;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::info;

use crate::constants::CONFIG_BACKUP_FILE_NAMES;
use crate::constants::SOURCE_BACKUP_FILE_NAMES;
use crate::utils::file_io::write_json_file;
use crate::DaemonConfig;
use crate::Result;
use crate::SnapshotError;
use crate::SystemError;

/// Where the configuration was last persisted and its checksum at that time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotState {
    pub path: PathBuf,
    pub checksum: [u8; 32],
}

impl DaemonConfig {
    /// SHA-256 over the JSON form, with [`VOLATILE_FIELDS`] cleared.
    pub fn checksum(&self) -> Result<[u8; 32]> {
        let mut sum_config = self.clone();
        sum_config.opts.clear();
        sum_config.encrypt_interface.clear();

        let bytes = serde_json::to_vec(&sum_config).map_err(SystemError::Serialization)?;
        Ok(Sha256::digest(&bytes).into())
    }

    /// Rotates older snapshots in `dir`, then writes this configuration as
    /// the current one and remembers its checksum.
    pub fn store_in_file(
        &mut self,
        dir: &Path,
    ) -> Result<()> {
        backup_files(dir, &CONFIG_BACKUP_FILE_NAMES);

        let path = dir.join(CONFIG_BACKUP_FILE_NAMES[0]);
        write_json_file(&path, self)?;

        let checksum = self.checksum()?;
        debug!("Stored configuration in {} (sha256 {})", path.display(), hex(&checksum));
        self.snapshot = Some(SnapshotState { path, checksum });
        Ok(())
    }

    pub fn snapshot_state(&self) -> Option<&SnapshotState> {
        self.snapshot.as_ref()
    }

    /// Checks that non-volatile parts of the configuration have not changed
    /// since the last [`store_in_file`](Self::store_in_file).
    ///
    /// Does not correct anything, the caller decides how to react.
    pub fn validate_unchanged(&self) -> Result<()> {
        let state = self.snapshot.as_ref().ok_or(SnapshotError::NotPersisted)?;
        if self.checksum()? == state.checksum {
            return Ok(());
        }
        Err(self.diff_from_file(&state.path).into())
    }

    fn diff_from_file(
        &self,
        path: &Path,
    ) -> SnapshotError {
        let persisted = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                serde_json::from_slice::<DaemonConfig>(&bytes).map_err(|e| {
                    format!("unmarshal failed {:?}: {}", String::from_utf8_lossy(&bytes), e)
                })
            });

        match persisted {
            Ok(persisted) => SnapshotError::DriftDetected {
                path: path.to_path_buf(),
                diff: persisted.diff(self),
            },
            Err(reason) => SnapshotError::PersistedSnapshotUnreadable {
                path: path.to_path_buf(),
                reason,
            },
        }
    }
}

/// Dumps the raw layered source into `dir`, rotating older dumps.
pub fn store_source_in_file(
    source: &Config,
    dir: &Path,
) -> Result<()> {
    backup_files(dir, &SOURCE_BACKUP_FILE_NAMES);

    let values: Value = source.clone().try_deserialize()?;
    let path = dir.join(SOURCE_BACKUP_FILE_NAMES[0]);
    write_json_file(&path, &values)?;
    info!("Stored configuration source in {}", path.display());
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
