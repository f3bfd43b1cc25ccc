// -
// Option keys read from the configuration source

pub const STATE_DIR_NAME: &str = "state_dir";
pub const ENABLE_IPV4_NAME: &str = "enable_ipv4";
pub const ENABLE_IPV6_NAME: &str = "enable_ipv6";
pub const ENCRYPT_INTERFACE_NAME: &str = "encrypt_interface";

pub const AUTH_MAP_ENTRIES_NAME: &str = "bpf_auth_map_max";
pub const CT_MAP_ENTRIES_GLOBAL_TCP_NAME: &str = "bpf_ct_global_tcp_max";
pub const CT_MAP_ENTRIES_GLOBAL_ANY_NAME: &str = "bpf_ct_global_any_max";
pub const NAT_MAP_ENTRIES_GLOBAL_NAME: &str = "bpf_nat_global_max";
pub const NEIGH_MAP_ENTRIES_GLOBAL_NAME: &str = "bpf_neigh_global_max";
pub const SOCK_REV_NAT_MAP_ENTRIES_NAME: &str = "bpf_sock_rev_map_max";
pub const FRAGMENTS_MAP_ENTRIES_NAME: &str = "bpf_fragments_map_max";
pub const MAP_ENTRIES_GLOBAL_DYNAMIC_SIZE_RATIO_NAME: &str = "bpf_map_dynamic_size_ratio";
pub const BPF_DISTRIBUTED_LRU_NAME: &str = "bpf_distributed_lru";
pub const POLICY_MAP_FULL_RECONCILIATION_INTERVAL_NAME: &str =
    "bpf_policy_map_full_reconciliation_interval";
pub const BPF_MAP_EVENT_BUFFERS_NAME: &str = "bpf_map_event_buffers";

/// Old key names still accepted, mapped onto their replacements.
pub const DEPRECATED_OPTION_NAMES: &[(&str, &str)] = &[
    ("ct_global_max_entries_tcp", CT_MAP_ENTRIES_GLOBAL_TCP_NAME),
    ("ct_global_max_entries_other", CT_MAP_ENTRIES_GLOBAL_ANY_NAME),
];

/// Environment variable prefix, e.g. `NETD__BPF_NAT_GLOBAL_MAX`
pub(crate) const ENV_PREFIX: &str = "NETD";
pub(crate) const ENV_SEPARATOR: &str = "__";

// -
// Map sizes (entries)

pub const AUTH_MAP_ENTRIES_MIN: usize = 1 << 8;
pub const AUTH_MAP_ENTRIES_MAX: usize = 1 << 24;
pub const AUTH_MAP_ENTRIES_DEFAULT: usize = 1 << 19;

/// 512Ki
pub const CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT: usize = 2 << 18;
/// 256Ki
pub const CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT: usize = 2 << 17;

pub const NAT_MAP_ENTRIES_GLOBAL_DEFAULT: usize =
    (CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT + CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT) * 2 / 3;

/// Sized like the non-TCP CT table
pub const SOCK_REV_NAT_MAP_ENTRIES_DEFAULT: usize = CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT;

/// Lower bounds applied by dynamic sizing only
pub const LIMIT_TABLE_AUTO_GLOBAL_TCP_MIN: usize = 1 << 17;
pub const LIMIT_TABLE_AUTO_GLOBAL_ANY_MIN: usize = 1 << 16;
pub const LIMIT_TABLE_AUTO_NAT_GLOBAL_MIN: usize = 1 << 17;
pub const LIMIT_TABLE_AUTO_SOCK_REV_NAT_MIN: usize = 1 << 16;

/// Hard limits for CT and NAT tables, whatever produced the value
pub const LIMIT_TABLE_MIN: usize = 1 << 10;
/// 16Mi entries, ~1GiB per map
pub const LIMIT_TABLE_MAX: usize = 1 << 24;

pub const FRAGMENTS_MAP_MIN: usize = 1 << 8;
pub const FRAGMENTS_MAP_MAX: usize = 1 << 16;
pub const FRAGMENTS_MAP_ENTRIES_DEFAULT: usize = 8192;

// -
// Element sizes (key + value bytes) as laid out by the datapath

pub const SIZEOF_CT_ELEMENT: usize = 94;
pub const SIZEOF_NAT_ELEMENT: usize = 94;
pub const SIZEOF_NEIGH_ELEMENT: usize = 24;
pub const SIZEOF_SOCK_REV_ELEMENT: usize = 52;

// -
// Persisted snapshots, newest first

pub const CONFIG_BACKUP_FILE_NAMES: [&str; 3] = [
    "daemon-config.json",
    "daemon-config-1.json",
    "daemon-config-2.json",
];

pub const SOURCE_BACKUP_FILE_NAMES: [&str; 3] = [
    "source-config.json",
    "source-config-1.json",
    "source-config-2.json",
];

pub(crate) const DEFAULT_STATE_DIR: &str = "/var/run/netd/state";

/// Full policy map reconciliation, in seconds
pub(crate) const POLICY_MAP_FULL_RECONCILIATION_INTERVAL_DEFAULT_SECS: u64 = 15 * 60;

// -
// Event buffers

/// Built-in per-map event buffer descriptors, replaced per key by user input
pub const DEFAULT_EVENT_BUFFER_DESCRIPTORS: &[(&str, &str)] = &[
    ("ipcache", "disabled_1024_1h"),
    ("ct_global", "disabled_1024_1h"),
];

pub(crate) const POSSIBLE_CPUS_PATH: &str = "/sys/devices/system/cpu/possible";
