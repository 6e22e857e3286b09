//! The compiled `abtest` binary: exit status, stderr and environment.

use abtest_core::config::{AbConfig, ConfigManager};

use crate::common::{Workspace, run_bin};

#[test]
fn test_init_then_set_follow_config_env_var() {
    let ws = Workspace::new();
    let team = ws.path_str("team.toml");
    let env = [("ABTEST_CONFIG", team.as_str())];

    let init = run_bin(&ws, &["config", "init"], &env);
    assert_eq!(init.status, Some(0), "{}", init.stderr);
    assert_eq!(init.stdout.trim(), format!("Config file created at {team}"));
    assert!(!ws.path("home/.config/abtest/config.toml").exists());

    let set = run_bin(&ws, &["config", "set", "experiment.alpha", "0.01"], &env);
    assert_eq!(set.status, Some(0), "{}", set.stderr);

    let path = run_bin(&ws, &["config", "path"], &env);
    assert_eq!(path.stdout.trim(), team);
    let config = AbConfig::load_from(&ws.path("team.toml")).unwrap();
    assert_eq!(config.experiment.alpha, 0.01);
}

#[test]
fn test_data_error_reported_once_with_status_2() {
    let ws = Workspace::new();
    let config = ws.write_config("");
    let raw = ws.path_str("raw.csv");

    let output = run_bin(&ws, &["--config", &config, "report", "--input", &raw], &[]);
    assert_eq!(output.status, Some(2));
    assert!(output.stdout.is_empty());
    assert_eq!(output.stderr.matches("non-singular pages").count(), 1);
}

#[test]
fn test_usage_error_exits_with_status_1() {
    let ws = Workspace::new();
    let config = ws.write_config("");

    let output = run_bin(&ws, &["--config", &config, "sample-size"], &[]);
    assert_eq!(output.status, Some(1));
    assert_eq!(output.stderr.matches("--baseline").count(), 1);
}

#[test]
fn test_missing_explicit_config_warns() {
    let ws = Workspace::new();
    let typo = ws.path_str("typo.toml");

    let output = run_bin(
        &ws,
        &["--config", &typo, "config", "get", "experiment.alpha"],
        &[],
    );
    assert_eq!(output.status, Some(0));
    assert_eq!(output.stdout.trim(), "0.05");
    assert!(output.stderr.contains("config file not found"));
}
