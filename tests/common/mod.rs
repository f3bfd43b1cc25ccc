use std::path::Path;
use std::path::PathBuf;

use netd_config::HostResources;
use netd_config::Result;

pub const GIB: u64 = 1 << 30;

/// Host with fixed memory and CPU count.
pub struct FixedHost {
    pub total_memory: u64,
    pub possible_cpus: usize,
}

impl HostResources for FixedHost {
    fn total_memory(&self) -> Result<u64> {
        Ok(self.total_memory)
    }

    fn possible_cpus(&self) -> Result<usize> {
        Ok(self.possible_cpus)
    }
}

pub fn write_config_file(
    dir: &Path,
    content: &str,
) -> PathBuf {
    let path = dir.join("netd.toml");
    std::fs::write(&path, content).unwrap();
    path
}
