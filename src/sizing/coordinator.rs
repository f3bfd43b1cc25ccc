//! Resolves kernel table sizes for a [`DaemonConfig`].
//!
//! Any size set explicitly by the operator overrides dynamic sizing for
//! that table. Limits are enforced afterwards by
//! [`DaemonConfig::check_map_size_limits`], whatever produced the values.

use tracing::debug;
use tracing::info;
use tracing::warn;

use super::is_active_ratio;
use super::DynamicSizeCalculator;
use super::HostResources;
use super::MapKind;
use crate::constants::*;
use crate::CapacityError;
use crate::ConfigSource;
use crate::DaemonConfig;
use crate::Limit;
use crate::Result;

/// NAT size derived from the combined CT capacity.
fn nat_from_ct(
    ct_tcp: usize,
    ct_any: usize,
) -> usize {
    (ct_tcp + ct_any) * 2 / 3
}

fn check_limits(
    kind: MapKind,
    value: usize,
) -> Result<()> {
    let (min, max) = kind.limits();
    if value < min {
        return Err(CapacityError::BoundViolation {
            option: kind.option_name(),
            value: value as i64,
            bound: min,
            limit: Limit::Min,
        }
        .into());
    }
    if value > max {
        return Err(CapacityError::BoundViolation {
            option: kind.option_name(),
            value: value as i64,
            bound: max,
            limit: Limit::Max,
        }
        .into());
    }
    Ok(())
}

impl DaemonConfig {
    /// Current entry count of a table
    pub fn map_entries(
        &self,
        kind: MapKind,
    ) -> usize {
        match kind {
            MapKind::Auth => self.auth_map_entries,
            MapKind::CtGlobalTcp => self.ct_map_entries_global_tcp,
            MapKind::CtGlobalAny => self.ct_map_entries_global_any,
            MapKind::NatGlobal => self.nat_map_entries_global,
            MapKind::NeighGlobal => self.neigh_map_entries_global,
            MapKind::Fragments => self.fragments_map_entries,
            MapKind::SockRevNat => MapKind::SockRevNat.policy().default_entries,
        }
    }

    fn map_entries_mut(
        &mut self,
        kind: MapKind,
    ) -> Option<&mut usize> {
        match kind {
            MapKind::Auth => Some(&mut self.auth_map_entries),
            MapKind::CtGlobalTcp => Some(&mut self.ct_map_entries_global_tcp),
            MapKind::CtGlobalAny => Some(&mut self.ct_map_entries_global_any),
            MapKind::NatGlobal => Some(&mut self.nat_map_entries_global),
            MapKind::NeighGlobal => Some(&mut self.neigh_map_entries_global),
            MapKind::Fragments => Some(&mut self.fragments_map_entries),
            MapKind::SockRevNat => None,
        }
    }

    /// Whether the operator set this table's size explicitly
    pub fn is_map_size_overridden(
        &self,
        kind: MapKind,
    ) -> bool {
        self.map_size_overrides.contains(kind)
    }

    fn read_map_entries(
        &mut self,
        source: &dyn ConfigSource,
        kind: MapKind,
    ) -> Result<()> {
        let option = kind.option_name();
        let Some(value) = source.get_int(option)? else {
            return Ok(());
        };
        let entries = usize::try_from(value).map_err(|_| CapacityError::BoundViolation {
            option,
            value,
            bound: kind.limits().0,
            limit: Limit::Min,
        })?;

        if let Some(slot) = self.map_entries_mut(kind) {
            *slot = entries;
            self.map_size_overrides.insert(kind);
        }
        Ok(())
    }

    /// Reads explicit table sizes, then sizes the remaining CT, NAT and
    /// neighbor tables from total memory when a dynamic size ratio is active.
    ///
    /// # Errors
    /// `InvalidRatio` when the ratio lies outside (0, 1] but is not 0, or when
    /// distributed tables are requested without an active ratio.
    pub fn calculate_bpf_map_sizes(
        &mut self,
        source: &dyn ConfigSource,
        host: &dyn HostResources,
    ) -> Result<()> {
        for kind in [
            MapKind::Auth,
            MapKind::CtGlobalTcp,
            MapKind::CtGlobalAny,
            MapKind::NatGlobal,
            MapKind::NeighGlobal,
            MapKind::Fragments,
        ] {
            self.read_map_entries(source, kind)?;
        }
        if let Some(interval) = source.get_duration(POLICY_MAP_FULL_RECONCILIATION_INTERVAL_NAME)? {
            self.policy_map_full_reconciliation_interval = interval;
        }

        // Don't attempt dynamic sizing if any element size is unknown
        if !self.map_element_sizes.is_complete() {
            debug!("Map element sizes not populated, skipping dynamic map sizing");
            return Ok(());
        }

        // The range (0.0, 1.0] is allowed since the result is clamped to the
        // table limits anyway, 0.98 does not hand 98% of memory to maps.
        let ratio = source
            .get_float(MAP_ENTRIES_GLOBAL_DYNAMIC_SIZE_RATIO_NAME)?
            .unwrap_or(0.0);
        if is_active_ratio(ratio) {
            self.bpf_maps_dynamic_size_ratio = ratio;
            let calculator = self.dynamic_size_calculator(host)?;
            self.calculate_dynamic_bpf_map_sizes(source, &calculator);
            return Ok(());
        }

        let reason = if self.bpf_distributed_lru {
            "distributed LRU is only valid with a specified dynamic map size ratio"
        } else if ratio < 0.0 {
            "dynamic map size ratio must be > 0.0"
        } else if ratio > 1.0 {
            "dynamic map size ratio must be <= 1.0"
        } else if ratio.is_nan() {
            "dynamic map size ratio is not a number"
        } else {
            return Ok(());
        };
        Err(CapacityError::InvalidRatio {
            option: MAP_ENTRIES_GLOBAL_DYNAMIC_SIZE_RATIO_NAME,
            value: ratio,
            reason,
        }
        .into())
    }

    /// Calculator for the configured ratio, for callers sizing further tables.
    ///
    /// In distributed mode sizes are multiples of the possible CPU count.
    pub fn dynamic_size_calculator(
        &self,
        host: &dyn HostResources,
    ) -> Result<DynamicSizeCalculator> {
        if !is_active_ratio(self.bpf_maps_dynamic_size_ratio) {
            return Ok(DynamicSizeCalculator::disabled());
        }

        let total_memory = host.total_memory()?;
        let possible_cpus = if self.bpf_distributed_lru {
            host.possible_cpus()?
        } else {
            1
        };
        Ok(DynamicSizeCalculator::new(
            self.bpf_maps_dynamic_size_ratio,
            total_memory,
            &self.map_element_sizes,
            possible_cpus,
        ))
    }

    fn calculate_dynamic_bpf_map_sizes(
        &mut self,
        source: &dyn ConfigSource,
        calculator: &DynamicSizeCalculator,
    ) {
        for kind in MapKind::DYNAMIC_SIZING_ORDER {
            let option = kind.option_name();
            if source.is_set(option) {
                debug!("option {} set by user to {}", option, self.map_entries(kind));
                continue;
            }

            let entries = match kind {
                // Keep at least as many neighbor entries as NAT entries
                MapKind::NeighGlobal => self.nat_map_entries_global,
                _ => calculator.size_for(kind.policy()),
            };
            if let Some(slot) = self.map_entries_mut(kind) {
                *slot = entries;
            }
            info!("option {} set by dynamic sizing to {}", option, entries);

            if kind == MapKind::NatGlobal {
                let ct_total = self.ct_map_entries_global_tcp + self.ct_map_entries_global_any;
                if self.nat_map_entries_global > ct_total {
                    self.nat_map_entries_global =
                        nat_from_ct(self.ct_map_entries_global_tcp, self.ct_map_entries_global_any);
                    warn!(
                        "option {} would exceed maximum determined by CT table sizes, capping to {}",
                        option, self.nat_map_entries_global
                    );
                }
            }
        }
    }

    /// Checks resolved sizes against their fixed limits.
    ///
    /// A NAT size above the combined CT size is recomputed when it still
    /// holds the built-in default and the operator did not set it; any other
    /// inconsistent NAT size is rejected.
    pub fn check_map_size_limits(&mut self) -> Result<()> {
        check_limits(MapKind::Auth, self.auth_map_entries)?;
        check_limits(MapKind::CtGlobalTcp, self.ct_map_entries_global_tcp)?;
        check_limits(MapKind::CtGlobalAny, self.ct_map_entries_global_any)?;
        check_limits(MapKind::NatGlobal, self.nat_map_entries_global)?;

        let ct_total = self.ct_map_entries_global_tcp + self.ct_map_entries_global_any;
        if self.nat_map_entries_global > ct_total {
            let nat_overridden = self.is_map_size_overridden(MapKind::NatGlobal);
            if self.nat_map_entries_global == NAT_MAP_ENTRIES_GLOBAL_DEFAULT && !nat_overridden {
                // CT tables were resized but NAT is still on its default
                self.nat_map_entries_global =
                    nat_from_ct(self.ct_map_entries_global_tcp, self.ct_map_entries_global_any);
                info!(
                    "option {} auto-sized to {} to fit CT table sizes",
                    NAT_MAP_ENTRIES_GLOBAL_NAME, self.nat_map_entries_global
                );
            } else {
                if nat_overridden && self.nat_map_entries_global == NAT_MAP_ENTRIES_GLOBAL_DEFAULT {
                    warn!(
                        "option {} was set explicitly to its default {}, not auto-sizing it",
                        NAT_MAP_ENTRIES_GLOBAL_NAME, NAT_MAP_ENTRIES_GLOBAL_DEFAULT
                    );
                }
                return Err(CapacityError::InconsistentOverride {
                    option: NAT_MAP_ENTRIES_GLOBAL_NAME,
                    value: self.nat_map_entries_global,
                    ceiling: ct_total,
                }
                .into());
            }
        }

        check_limits(MapKind::Fragments, self.fragments_map_entries)?;
        Ok(())
    }
}
