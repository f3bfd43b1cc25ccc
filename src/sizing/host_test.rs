use super::*;

#[test]
fn test_parse_cpu_ranges() {
    assert_eq!(parse_cpu_ranges("0"), Ok(1));
    assert_eq!(parse_cpu_ranges("0-3\n"), Ok(4));
    assert_eq!(parse_cpu_ranges("0-3,8,10-11"), Ok(7));
    assert_eq!(parse_cpu_ranges("0-127"), Ok(128));
}

#[test]
fn test_parse_cpu_ranges_rejects_malformed_lists() {
    for content in ["", "  \n", "a", "0-", "3-1", "0,,2"] {
        assert!(parse_cpu_ranges(content).is_err(), "{content:?} should be rejected");
    }
}

#[test]
fn test_system_resources_probe_running_host() {
    let host = SystemResources;
    assert!(host.total_memory().unwrap() > 0);
    assert!(host.possible_cpus().unwrap() >= 1);
}
