//! Statistics commands and the full analysis.

use crate::common::{Workspace, run_cli};

#[test]
fn test_sample_size_reference_value() {
    let text = run_cli(&["sample-size", "--baseline", "0.1204"]).unwrap();
    assert_eq!(text.trim(), "Required sample size: 17210 per group");
}

#[test]
fn test_sample_size_requires_baseline() {
    let ws = Workspace::new();
    let config = ws.write_config("");
    let err = run_cli(&["--config", &config, "sample-size"]).unwrap_err();
    assert!(err.to_string().contains("--baseline"));
}

#[test]
fn test_sample_size_from_config() {
    let ws = Workspace::new();
    let config = ws.write_config("[experiment]\nbaseline_rate = 0.1204\n");
    let text = run_cli(&["--config", &config, "--format", "json", "sample-size"]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let n = json["required_sample_size"].as_f64().unwrap();
    assert!((n - 17_210.118_424).abs() < 1e-3);
    assert_eq!(json["params"]["power"], 0.8);
}

#[test]
fn test_check_verdict() {
    let text = run_cli(&[
        "check",
        "--control",
        "145274",
        "--treatment",
        "145310",
        "--baseline",
        "0.1204",
    ])
    .unwrap();
    assert!(text.contains(
        "Control and treatment groups are sufficiently large to conduct hypothesis testing"
    ));

    let text = run_cli(&[
        "check",
        "--control",
        "100",
        "--treatment",
        "20000",
        "--baseline",
        "0.1204",
    ])
    .unwrap();
    assert!(text.contains("Control group not sufficiently large"));
}

#[test]
fn test_ci_json() {
    let text = run_cli(&[
        "--format",
        "json",
        "ci",
        "--control-conversions",
        "1000",
        "--treatment-conversions",
        "1200",
        "--control-users",
        "10000",
        "--treatment-users",
        "10000",
    ])
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(json["lower"].as_f64().unwrap() > 0.0);
    assert!((json["z"].as_f64().unwrap() - 1.959_964).abs() < 1e-6);
}

#[test]
fn test_ci_rejects_impossible_counts() {
    let err = run_cli(&[
        "ci",
        "--control-conversions",
        "20",
        "--treatment-conversions",
        "1",
        "--control-users",
        "10",
        "--treatment-users",
        "10",
    ])
    .unwrap_err();
    assert!(err.to_string().contains("cannot exceed"));
}

#[test]
fn test_analyze_significant_lift() {
    let ws = Workspace::new();
    let clean = ws.write_clean((1_000, 10_000), (1_400, 10_000));
    let text = run_cli(&[
        "analyze",
        "--input",
        &clean,
        "--practical-significance",
        "0.02",
    ])
    .unwrap();
    assert!(text.contains("Percentage of control users who saw ['old_page']: 50.0%"));
    assert!(text.contains("Control and treatment groups are sufficiently large"));
    assert!(text.contains("Reject H0"));
}

#[test]
fn test_analyze_json_no_difference() {
    let ws = Workspace::new();
    let config = ws.write_config("");
    ws.write_clean((120, 1_000), (120, 1_000));
    let text = run_cli(&["--config", &config, "--format", "json", "analyze"]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["significant"], false);
    assert_eq!(json["sample_size"]["verdict"], "both_insufficient");
    assert_eq!(json["baseline_rate"], 0.12);
}
