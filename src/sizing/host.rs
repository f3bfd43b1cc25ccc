use std::fs;

#[cfg(test)]
use mockall::automock;
use sysinfo::MemoryRefreshKind;
use sysinfo::RefreshKind;
use sysinfo::System;
use tracing::warn;

use crate::constants::POSSIBLE_CPUS_PATH;
use crate::Result;
use crate::SystemError;

/// Host facts that table sizing depends on.
#[cfg_attr(test, automock)]
pub trait HostResources {
    /// Total physical memory in bytes.
    fn total_memory(&self) -> Result<u64>;

    /// Number of CPUs the kernel may ever bring online.
    fn possible_cpus(&self) -> Result<usize>;
}

/// Probes the running system on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResources;

impl HostResources for SystemResources {
    fn total_memory(&self) -> Result<u64> {
        let mut sys =
            System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::everything()));
        sys.refresh_memory();

        match sys.total_memory() {
            0 => Err(SystemError::HostProbe("failed to get system memory".into()).into()),
            total => Ok(total),
        }
    }

    fn possible_cpus(&self) -> Result<usize> {
        match fs::read_to_string(POSSIBLE_CPUS_PATH) {
            Ok(content) => parse_cpu_ranges(&content)
                .map_err(|e| SystemError::HostProbe(format!("{}: {}", POSSIBLE_CPUS_PATH, e)).into()),
            Err(e) => {
                warn!(
                    "Unable to read {}: {}, falling back to available parallelism",
                    POSSIBLE_CPUS_PATH, e
                );
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .map_err(|e| SystemError::HostProbe(format!("failed to get number of CPUs: {e}")).into())
            }
        }
    }
}

/// Counts CPUs in a kernel CPU list such as `0-3,8,10-11`.
pub fn parse_cpu_ranges(content: &str) -> std::result::Result<usize, String> {
    let content = content.trim();
    if content.is_empty() {
        return Err("empty CPU list".into());
    }

    let mut count = 0;
    for range in content.split(',') {
        let parse = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid CPU id {s:?} in {content:?}: {e}"))
        };
        match range.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if end < start {
                    return Err(format!("invalid CPU range {range:?}"));
                }
                count += end - start + 1;
            }
            None => {
                parse(range)?;
                count += 1;
            }
        }
    }
    Ok(count)
}
