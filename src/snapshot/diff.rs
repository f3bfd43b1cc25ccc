use std::fmt;

use crate::DaemonConfig;

/// Fields that legitimately change after startup.
///
/// They are cleared before checksumming and never reported as drift.
pub const VOLATILE_FIELDS: &[&str] = &["opts", "encrypt_interface"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub persisted: String,
    pub live: String,
}

/// Field-by-field differences between a persisted and a live configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiff(Vec<FieldDiff>);

impl ConfigDiff {
    pub fn fields(&self) -> &[FieldDiff] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(
        &self,
        field: &str,
    ) -> bool {
        self.0.iter().any(|d| d.field == field)
    }
}

impl fmt::Display for ConfigDiff {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "  (no field-level differences)");
        }
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}: {} -> {}", d.field, d.persisted, d.live)?;
        }
        Ok(())
    }
}

macro_rules! diff_fields {
    ($diffs:ident, $persisted:expr, $live:expr, [$($field:ident),* $(,)?]) => {
        $(
            if $persisted.$field != $live.$field {
                $diffs.push(FieldDiff {
                    field: stringify!($field),
                    persisted: format!("{:?}", $persisted.$field),
                    live: format!("{:?}", $live.$field),
                });
            }
        )*
    };
}

impl DaemonConfig {
    /// Compares every persisted field except [`VOLATILE_FIELDS`].
    ///
    /// New fields must be listed here to take part in drift reports.
    pub fn diff(
        &self,
        live: &DaemonConfig,
    ) -> ConfigDiff {
        let mut diffs = Vec::new();
        diff_fields!(diffs, self, live, [
            state_dir,
            enable_ipv4,
            enable_ipv6,
            auth_map_entries,
            ct_map_entries_global_tcp,
            ct_map_entries_global_any,
            nat_map_entries_global,
            neigh_map_entries_global,
            fragments_map_entries,
            policy_map_full_reconciliation_interval,
            bpf_maps_dynamic_size_ratio,
            bpf_distributed_lru,
            map_element_sizes,
            bpf_map_event_buffers,
        ]);
        ConfigDiff(diffs)
    }
}
