//! Memory-proportional table sizing.
//!
//! Distributes a share of total memory across tables in proportion to their
//! default entry counts. Sizes provided by the operator bypass this entirely;
//! limits are checked afterwards by the coordinator.

use tracing::debug;
use tracing::info;

use super::MapElementSizes;
use super::MapSizePolicy;

/// Whether `ratio` turns dynamic sizing on. NaN never does.
pub fn is_active_ratio(ratio: f64) -> bool {
    ratio > 0.0 && ratio <= 1.0
}

/// Smallest multiple of `multiple` that is `>= n`.
pub fn round_up(
    n: usize,
    multiple: usize,
) -> usize {
    if multiple <= 1 {
        return n;
    }
    n.div_ceil(multiple).saturating_mul(multiple)
}

/// Largest multiple of `multiple` that is `<= n`.
pub fn round_down(
    n: usize,
    multiple: usize,
) -> usize {
    if multiple <= 1 {
        return n;
    }
    n / multiple * multiple
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Budget {
    memory_for_maps: u128,
    default_map_memory: u128,
    possible_cpus: usize,
}

/// Turns a table's `(default, min, max)` into an entry count.
///
/// When disabled every table keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicSizeCalculator {
    budget: Option<Budget>,
}

impl DynamicSizeCalculator {
    /// # Arguments
    /// * `ratio` - share of `total_memory` for tables, active in (0, 1]
    /// * `possible_cpus` - sizes are rounded to multiples of this; 1 unless
    ///   per-CPU distributed tables are used
    pub fn new(
        ratio: f64,
        total_memory: u64,
        sizes: &MapElementSizes,
        possible_cpus: usize,
    ) -> Self {
        if !is_active_ratio(ratio) {
            return Self::disabled();
        }

        let default_map_memory = sizes.default_map_memory();
        if default_map_memory == 0 {
            debug!("Map element sizes unknown, dynamic sizing disabled");
            return Self::disabled();
        }

        let memory_for_maps = (total_memory as f64 * ratio) as u128;
        info!(
            "Memory available for map entries ({:.3}% of {}B): {}B",
            ratio * 100.0,
            total_memory,
            memory_for_maps
        );
        debug!("Total memory for default map entries: {}", default_map_memory);

        Self {
            budget: Some(Budget {
                memory_for_maps,
                default_map_memory,
                possible_cpus: possible_cpus.max(1),
            }),
        }
    }

    pub fn disabled() -> Self {
        Self { budget: None }
    }

    pub fn is_active(&self) -> bool {
        self.budget.is_some()
    }

    /// Entry count for a table with the given default and clamp bounds.
    pub fn size(
        &self,
        default: usize,
        min: usize,
        max: usize,
    ) -> usize {
        let Some(budget) = self.budget else {
            return default;
        };
        let cpus = budget.possible_cpus;

        let proportional = default as u128 * budget.memory_for_maps / budget.default_map_memory;
        let entries = round_up(usize::try_from(proportional).unwrap_or(usize::MAX), cpus);
        if entries < min {
            round_up(min, cpus)
        } else if entries > max {
            round_down(max, cpus)
        } else {
            entries
        }
    }

    pub fn size_for(
        &self,
        policy: MapSizePolicy,
    ) -> usize {
        self.size(policy.default_entries, policy.min_entries, policy.max_entries)
    }
}
