//! `config` subcommands through the CLI entry point.

use crate::common::{Workspace, run_cli};

#[test]
fn test_init_set_get_roundtrip() {
    let ws = Workspace::new();
    let path = ws.path_str("cfg/abtest.toml");

    let text = run_cli(&["config", "init", "--file", &path]).unwrap();
    assert!(text.starts_with("Config file created at"));

    run_cli(&["--config", &path, "config", "set", "assignment.treatment_page", "landing_b"])
        .unwrap();
    let text = run_cli(&["--config", &path, "config", "get", "assignment.treatment_page"]).unwrap();
    assert_eq!(text.trim(), "landing_b");
}

#[test]
fn test_configured_columns_are_used() {
    let ws = Workspace::new();
    std::fs::write(
        ws.path("custom.csv"),
        "uid,arm,page,conv\n1,a,pa,1\n2,a,pa,0\n3,b,pb,1\n",
    )
    .unwrap();
    let config = ws.write_config(
        "[columns]\nuser = \"uid\"\ngroup = \"arm\"\npage = \"page\"\nconverted = \"conv\"\n\
         [assignment]\ncontrol_group = \"a\"\ntreatment_group = \"b\"\n\
         control_page = \"pa\"\ntreatment_page = \"pb\"\n",
    );
    let text = run_cli(&[
        "--config",
        &config,
        "report",
        "--input",
        &ws.path_str("custom.csv"),
    ])
    .unwrap();
    assert!(text.contains("Percentage of a users who saw ['pa']: 66.67%"));
    assert!(text.contains("Percentage of b users who saw ['pb']: 33.33%"));
}

#[test]
fn test_export_env() {
    let ws = Workspace::new();
    let config = ws.write_config("");
    let text = run_cli(&["--config", &config, "config", "export"]).unwrap();
    assert!(text.contains("ABTEST_EXPERIMENT_POWER=0.8"));
    assert!(text.contains("ABTEST_PATHS_CLEAN="));
}
