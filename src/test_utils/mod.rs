//! Shared helpers for unit tests: configuration sources and host mocks.
mod common;

pub use common::*;
