use netd_config::constants::*;
use netd_config::load_source;
use netd_config::store_source_in_file;
use netd_config::DaemonConfig;
use netd_config::Error;
use netd_config::MapElementSizes;
use netd_config::SnapshotError;

use crate::common::write_config_file;
use crate::common::FixedHost;
use crate::common::GIB;

#[test]
fn test_store_validate_and_detect_drift() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let path = write_config_file(
        dir.path(),
        &format!(
            "state_dir = {:?}\nbpf_map_dynamic_size_ratio = 0.01\nbpf_map_event_buffers = \"ipcache=enabled_100_24h\"\n",
            state_dir.to_str().unwrap()
        ),
    );
    let host = FixedHost {
        total_memory: 16 * GIB,
        possible_cpus: 8,
    };

    let source = load_source(path.to_str()).unwrap();
    let mut c = DaemonConfig::populate(&source, &host, MapElementSizes::datapath_defaults()).unwrap();
    assert_eq!(c.state_dir, state_dir);

    store_source_in_file(&source, &c.state_dir).unwrap();
    let state_dir = c.state_dir.clone();
    c.store_in_file(&state_dir).unwrap();
    assert!(state_dir.join(SOURCE_BACKUP_FILE_NAMES[0]).is_file());
    c.validate_unchanged().unwrap();

    // Runtime toggles are not drift
    c.opts.set("Debug", true);
    c.validate_unchanged().unwrap();

    c.ct_map_entries_global_tcp += 1;
    let err = c.validate_unchanged().unwrap_err();
    assert!(!err.is_fatal());
    match err {
        Error::Snapshot(SnapshotError::DriftDetected { diff, .. }) => {
            assert_eq!(diff.fields().len(), 1);
            assert!(diff.contains("ct_map_entries_global_tcp"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Persisting again accepts the new state and keeps the previous one
    c.store_in_file(&state_dir).unwrap();
    c.validate_unchanged().unwrap();
    assert!(state_dir.join(CONFIG_BACKUP_FILE_NAMES[1]).is_file());
}

#[test]
fn test_restart_produces_identical_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config_file(dir.path(), "bpf_map_dynamic_size_ratio = 0.0025\n");
    let host = FixedHost {
        total_memory: 32 * GIB,
        possible_cpus: 2,
    };

    let source = load_source(path.to_str()).unwrap();
    let first = DaemonConfig::populate(&source, &host, MapElementSizes::datapath_defaults()).unwrap();
    let second = DaemonConfig::populate(&source, &host, MapElementSizes::datapath_defaults()).unwrap();

    assert_eq!(first.checksum().unwrap(), second.checksum().unwrap());
    assert!(first.diff(&second).is_empty());
}
