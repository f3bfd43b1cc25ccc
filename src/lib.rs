//! Capacity planning and configuration integrity for a network daemon.
//!
//! - [`sizing`]: sizes kernel tables from total memory unless the operator
//!   pinned explicit sizes, then validates the resulting capacity plan.
//! - [`snapshot`]: persists the resolved configuration with generational
//!   backups and detects drift through a content checksum.
//! - [`event_buffer`]: parses per-map event buffer descriptors.

mod config;
mod errors;
pub mod constants;
pub mod event_buffer;
pub mod sizing;
pub mod snapshot;
pub mod utils;

pub use self::config::*;
pub use errors::*;
pub use event_buffer::*;
pub use sizing::*;
pub use snapshot::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
