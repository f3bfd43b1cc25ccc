//! Capacity planning for kernel-resident tables.

mod calculator;
mod coordinator;
mod host;
mod policy;
pub use calculator::*;
pub use host::*;
pub use policy::*;

#[cfg(test)]
mod host_test;
