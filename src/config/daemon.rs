use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::ConfigSource;
use crate::constants::*;
use crate::snapshot::SnapshotState;
use crate::EventBufferConfig;
use crate::EventBufferConfigs;
use crate::HostResources;
use crate::MapElementSizes;
use crate::MapSizeOverrides;
use crate::Result;

/// Mutable per-process runtime options.
///
/// These may be toggled after startup and are excluded from drift detection.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RuntimeOptions(BTreeMap<String, bool>);

impl RuntimeOptions {
    pub fn set(
        &mut self,
        name: impl Into<String>,
        enabled: bool,
    ) {
        self.0.insert(name.into(), enabled);
    }

    pub fn is_enabled(
        &self,
        name: &str,
    ) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Fully resolved daemon configuration.
///
/// Built once by [`DaemonConfig::populate`] and passed by reference to the
/// subsystems that need it. The caller serializes `populate`,
/// `store_in_file` and `validate_unchanged`; nothing here locks.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DaemonConfig {
    /// Directory holding persisted configuration snapshots
    pub state_dir: PathBuf,

    pub enable_ipv4: bool,

    pub enable_ipv6: bool,

    /// Max entries of the authentication map
    pub auth_map_entries: usize,

    /// Max entries of the TCP connection tracking table
    pub ct_map_entries_global_tcp: usize,

    /// Max entries of the non-TCP connection tracking table
    pub ct_map_entries_global_any: usize,

    /// Max entries of the NAT table
    pub nat_map_entries_global: usize,

    /// Max entries of the neighbor table, at least as large as NAT
    pub neigh_map_entries_global: usize,

    /// Max entries of the IP fragment tracking map
    pub fragments_map_entries: usize,

    pub policy_map_full_reconciliation_interval: Duration,

    /// Share of total memory for dynamically sized tables; 0 when disabled
    pub bpf_maps_dynamic_size_ratio: f64,

    /// Per-CPU sharded LRU tables; requires an active dynamic size ratio
    pub bpf_distributed_lru: bool,

    pub map_element_sizes: MapElementSizes,

    /// Raw per-map event buffer descriptors as given by the operator
    pub bpf_map_event_buffers: BTreeMap<String, String>,

    /// Interfaces used for encryption; detected at runtime, volatile
    pub encrypt_interface: Vec<String>,

    /// Runtime-mutable options, volatile
    pub opts: RuntimeOptions,

    #[serde(skip)]
    pub(crate) event_buffer_configs: EventBufferConfigs,

    #[serde(skip)]
    pub(crate) map_size_overrides: MapSizeOverrides,

    #[serde(skip)]
    pub(crate) snapshot: Option<SnapshotState>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            enable_ipv4: true,
            enable_ipv6: false,
            auth_map_entries: AUTH_MAP_ENTRIES_DEFAULT,
            ct_map_entries_global_tcp: CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT,
            ct_map_entries_global_any: CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT,
            nat_map_entries_global: NAT_MAP_ENTRIES_GLOBAL_DEFAULT,
            neigh_map_entries_global: NAT_MAP_ENTRIES_GLOBAL_DEFAULT,
            fragments_map_entries: FRAGMENTS_MAP_ENTRIES_DEFAULT,
            policy_map_full_reconciliation_interval: Duration::from_secs(
                POLICY_MAP_FULL_RECONCILIATION_INTERVAL_DEFAULT_SECS,
            ),
            bpf_maps_dynamic_size_ratio: 0.0,
            bpf_distributed_lru: false,
            map_element_sizes: MapElementSizes::default(),
            bpf_map_event_buffers: BTreeMap::new(),
            encrypt_interface: Vec::new(),
            opts: RuntimeOptions::default(),
            event_buffer_configs: EventBufferConfigs::default(),
            map_size_overrides: MapSizeOverrides::default(),
            snapshot: None,
        }
    }
}

impl DaemonConfig {
    /// Resolves the full configuration from `source`.
    ///
    /// `element_sizes` are the datapath's key + value sizes per table; when
    /// any of them is 0, tables keep their configured or default sizes.
    ///
    /// # Errors
    /// Any error returned here is fatal at startup, see [`crate::Error::is_fatal`].
    pub fn populate(
        source: &dyn ConfigSource,
        host: &dyn HostResources,
        element_sizes: MapElementSizes,
    ) -> Result<Self> {
        let mut c = Self::default();
        c.set_map_element_sizes(element_sizes);

        if let Some(dir) = source.get_string(STATE_DIR_NAME)? {
            c.state_dir = PathBuf::from(dir);
        }
        if let Some(v) = source.get_bool(ENABLE_IPV4_NAME)? {
            c.enable_ipv4 = v;
        }
        if let Some(v) = source.get_bool(ENABLE_IPV6_NAME)? {
            c.enable_ipv6 = v;
        }
        if let Some(ifaces) = source.get_string_list(ENCRYPT_INTERFACE_NAME)? {
            c.encrypt_interface = ifaces;
        }
        if let Some(v) = source.get_bool(BPF_DISTRIBUTED_LRU_NAME)? {
            c.bpf_distributed_lru = v;
        }

        c.calculate_bpf_map_sizes(source, host)?;
        c.check_map_size_limits()?;

        if let Some(buffers) = source.get_string_map(BPF_MAP_EVENT_BUFFERS_NAME)? {
            c.bpf_map_event_buffers = buffers;
        }
        c.event_buffer_configs = EventBufferConfigs::with_defaults()?;
        c.event_buffer_configs.merge(&c.bpf_map_event_buffers)?;

        info!(
            "Resolved map sizes: auth={} ct_tcp={} ct_any={} nat={} neigh={} fragments={}",
            c.auth_map_entries,
            c.ct_map_entries_global_tcp,
            c.ct_map_entries_global_any,
            c.nat_map_entries_global,
            c.neigh_map_entries_global,
            c.fragments_map_entries
        );
        debug!("Resolved event buffers: {:?}", c.event_buffer_configs);

        Ok(c)
    }

    /// Sets the table element sizes (key + value bytes) used by dynamic sizing.
    pub fn set_map_element_sizes(
        &mut self,
        sizes: MapElementSizes,
    ) {
        self.map_element_sizes = sizes;
    }

    /// Event buffer settings for `name`, disabled when nothing was configured.
    pub fn event_buffer_config(
        &self,
        name: &str,
    ) -> EventBufferConfig {
        self.event_buffer_configs.get(name)
    }

    pub fn is_dual_stack(&self) -> bool {
        self.enable_ipv4 && self.enable_ipv6
    }
}
