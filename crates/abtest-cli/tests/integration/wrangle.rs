//! Cleaning a raw export end to end.

use crate::common::{Workspace, run_cli};
use abtest_core::{ColumnNames, Dataset};

#[test]
fn test_wrangle_writes_clean_file() {
    let ws = Workspace::new();
    let config = ws.write_config("");

    let text = run_cli(&["--config", &config, "wrangle"]).unwrap();
    assert!(text.contains("Rows read: 10"));
    assert!(text.contains("Misaligned rows dropped: 2"));
    assert!(text.contains("Duplicate users dropped: 1"));
    assert!(text.contains("Rows kept: 7"));

    let cleaned = Dataset::from_path(ws.path("clean.csv"), &ColumnNames::default()).unwrap();
    assert_eq!(cleaned.len(), 7);
    assert_eq!(cleaned.headers().len(), 5);
    // the later of the two 773192 rows survives
    let last = (0..cleaned.len())
        .find(|&i| cleaned.user(i) == "773192")
        .unwrap();
    assert_eq!(last, 5);
}

#[test]
fn test_wrangle_explicit_paths_json() {
    let ws = Workspace::new();
    let out_path = ws.path_str("nested/out/clean.csv");
    let text = run_cli(&[
        "--format",
        "json",
        "wrangle",
        "--input",
        &ws.path_str("raw.csv"),
        "--output",
        &out_path,
    ])
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["summary"]["rows_out"], 7);
    assert_eq!(json["summary"]["group_counts"][0][0], "control");
    assert_eq!(json["summary"]["group_counts"][0][1], 4);
    assert!(ws.path("nested/out/clean.csv").exists());
}

#[test]
fn test_wrangle_then_report() {
    let ws = Workspace::new();
    let config = ws.write_config("");
    run_cli(&["--config", &config, "wrangle"]).unwrap();

    let text = run_cli(&["--config", &config, "report", "--group", "control"]).unwrap();
    assert!(text.starts_with("Percentage of control users who saw ['old_page']: 57.14%"));
    assert!(text.contains("conversions: 1 / 4 (0.25)"));
}

#[test]
fn test_report_on_raw_data_fails() {
    let ws = Workspace::new();
    let err = run_cli(&["report", "--input", &ws.path_str("raw.csv")]).unwrap_err();
    assert!(err.to_string().contains("non-singular pages"));
}

#[test]
fn test_wrangle_missing_input() {
    let ws = Workspace::new();
    let err = run_cli(&["wrangle", "--input", &ws.path_str("absent.csv")]).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}
