use netd_config::constants::*;
use netd_config::load_source;
use netd_config::CapacityError;
use netd_config::DaemonConfig;
use netd_config::Error;
use netd_config::MapElementSizes;
use netd_config::MapKind;

use crate::common::write_config_file;
use crate::common::FixedHost;
use crate::common::GIB;

fn populate(
    toml: &str,
    host: &FixedHost,
) -> netd_config::Result<DaemonConfig> {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config_file(dir.path(), toml);
    let source = load_source(path.to_str())?;
    DaemonConfig::populate(&source, host, MapElementSizes::datapath_defaults())
}

#[test]
fn test_dynamic_plan_on_large_host() {
    let host = FixedHost {
        total_memory: 64 * GIB,
        possible_cpus: 16,
    };
    let c = populate(
        r#"
        bpf_map_dynamic_size_ratio = 0.0025
        bpf_distributed_lru = true
        bpf_ct_global_any_max = 262144
        "#,
        &host,
    )
    .unwrap();

    // Explicit size is kept as given
    assert_eq!(c.ct_map_entries_global_any, 262144);
    assert!(c.is_map_size_overridden(MapKind::CtGlobalAny));

    assert!(c.ct_map_entries_global_tcp > CT_MAP_ENTRIES_GLOBAL_TCP_DEFAULT);
    assert_eq!(c.ct_map_entries_global_tcp % 16, 0);
    assert!(c.nat_map_entries_global <= c.ct_map_entries_global_tcp + c.ct_map_entries_global_any);
    assert!(c.neigh_map_entries_global >= c.nat_map_entries_global);
    for kind in [MapKind::CtGlobalTcp, MapKind::NatGlobal] {
        let (min, max) = kind.limits();
        let entries = c.map_entries(kind);
        assert!(entries >= min && entries <= max);
    }

    let calculator = c.dynamic_size_calculator(&host).unwrap();
    assert_eq!(calculator.size_for(MapKind::SockRevNat.policy()) % 16, 0);
}

#[test]
fn test_dynamic_plan_on_small_host_clamps_to_minimums() {
    let host = FixedHost {
        total_memory: GIB / 2,
        possible_cpus: 1,
    };
    let c = populate("bpf_map_dynamic_size_ratio = 0.0025\n", &host).unwrap();

    assert_eq!(c.ct_map_entries_global_tcp, LIMIT_TABLE_AUTO_GLOBAL_TCP_MIN);
    assert_eq!(c.ct_map_entries_global_any, LIMIT_TABLE_AUTO_GLOBAL_ANY_MIN);
    assert_eq!(c.nat_map_entries_global, LIMIT_TABLE_AUTO_NAT_GLOBAL_MIN);
}

#[test]
fn test_static_plan_derives_nat_from_small_ct_tables() {
    let host = FixedHost {
        total_memory: 8 * GIB,
        possible_cpus: 4,
    };
    let c = populate(
        r#"
        ct_global_max_entries_tcp = 4096
        bpf_ct_global_any_max = 4096
        "#,
        &host,
    )
    .unwrap();

    assert_eq!(c.ct_map_entries_global_tcp, 4096);
    assert_eq!(c.nat_map_entries_global, 5461);
}

#[test]
fn test_inconsistent_plans_are_fatal() {
    let host = FixedHost {
        total_memory: 8 * GIB,
        possible_cpus: 4,
    };
    let cases = [
        "bpf_distributed_lru = true\n",
        "bpf_map_dynamic_size_ratio = 1.5\n",
        "bpf_ct_global_tcp_max = 4096\nbpf_ct_global_any_max = 4096\nbpf_nat_global_max = 100000\n",
        "bpf_fragments_map_max = 70000\n",
        "bpf_map_event_buffers = \"ipcache=enabled_100\"\n",
    ];

    for toml in cases {
        let err = populate(toml, &host).unwrap_err();
        assert!(err.is_fatal(), "{toml}: {err}");
    }

    let err = populate(cases[2], &host).unwrap_err();
    assert!(matches!(
        err,
        Error::Capacity(CapacityError::InconsistentOverride {
            value: 100000,
            ceiling: 8192,
            ..
        })
    ));
}
