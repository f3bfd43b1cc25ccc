//! Daemon Configuration Error Hierarchy
//!
//! Errors are grouped by the concern that raises them. Capacity and
//! descriptor errors are fatal at startup; snapshot errors are returned to
//! the caller, which decides how severe drift is.

use std::path::PathBuf;

use config::ConfigError;

use crate::snapshot::ConfigDiff;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (filesystem, serialization, host probing)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Lookup or type conversion failures in the configuration source
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Inconsistent capacity plan for kernel tables
    #[error(transparent)]
    Capacity(#[from] CapacityError),

    /// An event buffer descriptor failed format validation
    #[error("invalid {option} entry for map {map}: {source}")]
    MalformedDescriptor {
        option: &'static str,
        map: String,
        #[source]
        source: EventBufferError,
    },

    /// Persisted configuration snapshot checks
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl Error {
    /// Whether the daemon must refuse to start with this error.
    ///
    /// Drift detection never halts the process by itself.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Snapshot(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to probe host resources: {0}")]
    HostProbe(String),
}

/// Which side of a fixed limit a value fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Min,
    Max,
}

#[derive(Debug, thiserror::Error)]
pub enum CapacityError {
    /// Ratio outside (0, 1], or distributed mode without an active ratio
    #[error("{option}: {reason} (got {value}, allowed range is (0.0, 1.0])")]
    InvalidRatio {
        option: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Resolved table size outside its fixed limits
    #[error("{}", bound_violation_message(.option, .value, .bound, .limit))]
    BoundViolation {
        option: &'static str,
        value: i64,
        bound: usize,
        limit: Limit,
    },

    /// NAT explicitly sized above the combined CT capacity
    #[error("{option}: specified NAT table size {value} must not exceed maximum CT table size {ceiling}")]
    InconsistentOverride {
        option: &'static str,
        value: usize,
        ceiling: usize,
    },
}

fn bound_violation_message(
    option: &str,
    value: &i64,
    bound: &usize,
    limit: &Limit,
) -> String {
    match limit {
        Limit::Min => format!("{option}: specified max entries {value} must be greater or equal to {bound}"),
        Limit::Max => format!("{option}: specified max entries {value} must not exceed maximum {bound}"),
    }
}

/// Parse failures for `<enabled|disabled>_<size>_<ttl>` descriptors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBufferError {
    #[error("unexpected event buffer descriptor {descriptor:?}: expected 3 '_'-separated fields like 'enabled_100_24h', found {found}")]
    WrongTokenCount { descriptor: String, found: usize },

    #[error("could not parse event buffer enabled flag {token:?}: must be either 'enabled' or 'disabled'")]
    InvalidEnabledFlag { token: String },

    #[error("could not parse event buffer max size {token:?}: {reason}")]
    InvalidMaxSize { token: String, reason: String },

    #[error("event buffer max size cannot be less than zero ({value})")]
    NegativeMaxSize { value: i64 },

    #[error("could not parse event buffer ttl duration {token:?}: {reason}")]
    InvalidTtl { token: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Live configuration checksum no longer matches the persisted one
    #[error("configuration differs from snapshot {}:\n{diff}", .path.display())]
    DriftDetected { path: PathBuf, diff: ConfigDiff },

    /// Checksum mismatch, and the persisted snapshot could not be loaded to diff against
    #[error("configuration checksum changed, and snapshot {} is unreadable: {reason}", .path.display())]
    PersistedSnapshotUnreadable { path: PathBuf, reason: String },

    #[error("configuration has not been persisted yet")]
    NotPersisted,
}
