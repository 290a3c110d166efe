//! Every registered scenario run from an on-disk bench directory.

use vigil_bench::{registry, run, run_scenario, BenchError, FailureReason};
use vigil_common::Sample;
use vigil_conformance::{init_logging, samples, small_sine, BenchDir};

fn boundary_data() -> Vec<Sample> {
    samples(&[
        999_999,
        1_000_000,
        1_000_001,
        i32::MIN,
        -1,
        0,
        i32::MAX,
        2_000_000_000,
    ])
}

#[test]
fn every_scenario_passes_on_sine_data() {
    init_logging();
    let bench = BenchDir::new(&small_sine(), &boundary_data());
    let failed: Vec<String> = registry()
        .iter()
        .map(|s| run(s, &bench.config))
        .filter(|o| !o.passed)
        .map(|o| format!("{}::{}: {:?}", o.suite, o.name, o.reasons))
        .collect();
    assert!(failed.is_empty(), "{failed:#?}");
}

#[test]
fn config_file_drives_threshold_and_clock() {
    let toml = r#"
[bench]
name = "negative"

[clock]
period = "8ns"

[threshold]
value = "-0x64"

[backpressure]
probability = 0.6
seed = 99
"#;
    let bench = BenchDir::with_toml(toml, &small_sine(), &samples(&[-101, -100, -99]));
    assert_eq!(bench.config.threshold.value, Sample::from_signed(-100));
    assert_eq!(bench.config.data.test_data, bench.path().join("test_data.csv"));
    for id in [
        "axis_dataover::basic",
        "axis_dataover::boundary",
        "axis_master::backpressure",
    ] {
        let outcome = run_scenario(id, &bench.config).unwrap();
        assert!(outcome.passed, "{id}: {:?}", outcome.reasons);
        assert!(outcome.cycles > 0);
        assert_eq!(outcome.final_time.fs % 4_000_000, 0);
    }
}

#[test]
fn missing_data_file_fails_setup_only_for_file_scenarios() {
    let toml = "[data]\nreference = \"nowhere.csv\"\n";
    let bench = BenchDir::with_toml(toml, &[], &boundary_data());
    let outcome = run_scenario("axis_master::oneshot", &bench.config).unwrap();
    assert!(!outcome.passed);
    assert!(matches!(&outcome.reasons[0], FailureReason::Setup(m) if m.contains("nowhere.csv")));
    assert!(run_scenario("two_dataover::basic", &bench.config).unwrap().passed);
}

#[test]
fn watchdog_timeout_reports_count_mismatch() {
    let toml = "[watchdog]\ndone_cycles = 50\n";
    let bench = BenchDir::with_toml(toml, &small_sine(), &boundary_data());
    let outcome = run_scenario("axis_master::oneshot", &bench.config).unwrap();
    assert!(!outcome.passed);
    assert!(outcome
        .reasons
        .iter()
        .any(|r| matches!(r, FailureReason::Timeout { cycles: 50, .. })));
    assert!(outcome
        .reasons
        .iter()
        .any(|r| r.to_string().starts_with("data count mismatch")));
    assert!(outcome.comparison.unwrap().mismatches.is_empty());
}

#[test]
fn outcomes_serialize_for_reports() {
    let bench = BenchDir::new(&small_sine(), &boundary_data());
    let outcome = run_scenario("axis_master::sent_count", &bench.config).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["suite"], "axis_master");
    assert_eq!(json["passed"], true);
    assert_eq!(json["comparison"]["expected_len"], 101);
    assert_eq!(json["comparison"]["received_len"], 101);
}

#[test]
fn unknown_scenario_is_an_error() {
    let err = run_scenario("nonexistent::x", &Default::default()).unwrap_err();
    assert!(matches!(err, BenchError::UnknownScenario(ref id) if id == "nonexistent::x"));
}
