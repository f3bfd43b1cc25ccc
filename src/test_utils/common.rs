use std::path::Path;

use config::Config;
use config::Value;

use crate::DaemonConfig;
use crate::MapElementSizes;
use crate::MockHostResources;

pub const GIB: u64 = 1 << 30;

/// Builds a configuration source from key/value overrides.
pub fn source_with(pairs: &[(&str, Value)]) -> Config {
    let mut builder = Config::builder();
    for (key, value) in pairs {
        builder = builder.set_override(*key, value.clone()).unwrap();
    }
    builder.build().unwrap()
}

pub fn empty_source() -> Config {
    source_with(&[])
}

/// A host with `total_memory` bytes and `cpus` possible CPUs.
pub fn mock_host(
    total_memory: u64,
    cpus: usize,
) -> MockHostResources {
    let mut host = MockHostResources::new();
    host.expect_total_memory().returning(move || Ok(total_memory));
    host.expect_possible_cpus().returning(move || Ok(cpus));
    host
}

/// A host that must not be probed.
pub fn unprobed_host() -> MockHostResources {
    let mut host = MockHostResources::new();
    host.expect_total_memory().never();
    host.expect_possible_cpus().never();
    host
}

/// Populates a configuration from `pairs` on a 4GiB single-CPU host.
pub fn populate_with(pairs: &[(&str, Value)]) -> DaemonConfig {
    DaemonConfig::populate(&source_with(pairs), &mock_host(4 * GIB, 1), MapElementSizes::datapath_defaults())
        .expect("populate should succeed")
}

pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
