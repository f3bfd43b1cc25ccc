use std::path::PathBuf;
use std::time::Duration;

use super::*;
use crate::constants::*;
use crate::test_utils::*;
use crate::CapacityError;
use crate::Error;
use crate::MapElementSizes;

#[test]
fn populate_with_empty_source_should_use_defaults() {
    let c = DaemonConfig::populate(&empty_source(), &unprobed_host(), MapElementSizes::datapath_defaults()).unwrap();

    assert_eq!(c.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
    assert!(c.enable_ipv4);
    assert!(!c.enable_ipv6);
    assert!(!c.is_dual_stack());
    assert_eq!(c.auth_map_entries, AUTH_MAP_ENTRIES_DEFAULT);
    assert_eq!(c.ct_map_entries_global_tcp, CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT);
    assert_eq!(c.ct_map_entries_global_any, CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT);
    assert_eq!(c.nat_map_entries_global, NAT_MAP_ENTRIES_GLOBAL_DEFAULT);
    assert_eq!(c.neigh_map_entries_global, NAT_MAP_ENTRIES_GLOBAL_DEFAULT);
    assert_eq!(c.fragments_map_entries, FRAGMENTS_MAP_ENTRIES_DEFAULT);
    assert_eq!(c.policy_map_full_reconciliation_interval, Duration::from_secs(900));
    assert_eq!(c.map_element_sizes, MapElementSizes::datapath_defaults());
    assert!(c.snapshot_state().is_none());
}

#[test]
fn populate_should_read_plain_options() {
    let c = populate_with(&[
        (STATE_DIR_NAME, "/tmp/netd".into()),
        (ENABLE_IPV6_NAME, true.into()),
        (ENCRYPT_INTERFACE_NAME, "eth0,eth1".into()),
        (FRAGMENTS_MAP_ENTRIES_NAME, 1024_i64.into()),
    ]);

    assert_eq!(c.state_dir, PathBuf::from("/tmp/netd"));
    assert!(c.is_dual_stack());
    assert_eq!(c.encrypt_interface, vec!["eth0", "eth1"]);
    assert_eq!(c.fragments_map_entries, 1024);
}

#[test]
fn populate_should_size_tables_from_memory() {
    // 5% of 4GiB is about 1.4 times the default map memory
    let c = populate_with(&[(MAP_ENTRIES_GLOBAL_DYNAMIC_SIZE_RATIO_NAME, 0.05.into())]);

    assert_eq!(c.bpf_maps_dynamic_size_ratio, 0.05);
    assert!(c.ct_map_entries_global_tcp > CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT);
    assert!(c.ct_map_entries_global_any > CT_MAP_ENTRIES_GLOBAL_ANY_DEFAULT);
    assert_eq!(c.neigh_map_entries_global, c.nat_map_entries_global);
    assert!(c.nat_map_entries_global <= c.ct_map_entries_global_tcp + c.ct_map_entries_global_any);
}

#[test]
fn populate_should_reject_out_of_bounds_sizes() {
    let source = source_with(&[(AUTH_MAP_ENTRIES_NAME, 100_i64.into())]);

    let err =
        DaemonConfig::populate(&source, &unprobed_host(), MapElementSizes::datapath_defaults()).unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, Error::Capacity(CapacityError::BoundViolation { .. })));
    assert_eq!(
        err.to_string(),
        "bpf_auth_map_max: specified max entries 100 must be greater or equal to 256"
    );
}

#[test]
fn populate_should_merge_event_buffers_over_defaults() {
    let c = populate_with(&[(BPF_MAP_EVENT_BUFFERS_NAME, "ipcache=enabled_100_24h,policy=enabled_0_1m".into())]);

    let ipcache = c.event_buffer_config("ipcache");
    assert!(ipcache.enabled);
    assert_eq!(ipcache.max_size, 100);
    assert_eq!(ipcache.ttl, Duration::from_secs(24 * 3600));

    // Untouched default entry
    let ct = c.event_buffer_config("ct_global");
    assert!(!ct.enabled);
    assert_eq!(ct.max_size, 1024);
    assert_eq!(ct.ttl, Duration::from_secs(3600));

    // Zero size never enables a buffer
    assert!(!c.event_buffer_config("policy").enabled);
    assert_eq!(c.event_buffer_config("unknown"), Default::default());
    assert_eq!(c.bpf_map_event_buffers.len(), 2);
}

#[test]
fn populate_should_reject_malformed_event_buffer() {
    let source = source_with(&[(BPF_MAP_EVENT_BUFFERS_NAME, "ipcache=on_100_24h".into())]);

    let err =
        DaemonConfig::populate(&source, &unprobed_host(), MapElementSizes::datapath_defaults()).unwrap_err();

    assert!(err.is_fatal());
    match err {
        Error::MalformedDescriptor { option, map, .. } => {
            assert_eq!(option, BPF_MAP_EVENT_BUFFERS_NAME);
            assert_eq!(map, "ipcache");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn serialized_form_should_omit_internal_state() {
    let mut c = DaemonConfig::default();
    c.opts.set("Debug", true);

    let value = serde_json::to_value(&c).unwrap();
    let fields = value.as_object().unwrap();

    assert_eq!(fields["opts"], serde_json::json!({"Debug": true}));
    assert!(fields.contains_key("bpf_map_event_buffers"));
    assert!(!fields.contains_key("event_buffer_configs"));
    assert!(!fields.contains_key("map_size_overrides"));
    assert!(!fields.contains_key("snapshot"));
}

#[test]
fn runtime_options_should_default_to_disabled() {
    let mut opts = RuntimeOptions::default();
    assert!(!opts.is_enabled("Debug"));

    opts.set("Debug", true);
    opts.set("PolicyTracing", false);
    assert!(opts.is_enabled("Debug"));
    assert!(!opts.is_enabled("PolicyTracing"));

    opts.clear();
    assert_eq!(opts, RuntimeOptions::default());
}
