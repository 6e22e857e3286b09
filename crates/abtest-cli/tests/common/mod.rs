//! Common fixtures for abtest integration tests.

use std::path::PathBuf;
use std::process::Command;

use abtest_cli::Cli;
use clap::Parser;
use tempfile::TempDir;

/// Raw export in the shape of the public landing-page dataset: one
/// misaligned row per group and one user logged twice.
pub const RAW_CSV: &str = "\
user_id,timestamp,group,landing_page,converted
851104,2017-01-21 22:11:48.556739,control,old_page,0
804228,2017-01-12 08:01:45.159739,control,old_page,0
661590,2017-01-11 16:55:06.154213,treatment,new_page,0
853541,2017-01-08 18:28:03.143765,treatment,new_page,0
864975,2017-01-21 01:52:26.210827,control,old_page,1
936923,2017-01-10 15:20:49.083499,control,new_page,0
679687,2017-01-19 03:26:46.940749,treatment,old_page,1
773192,2017-01-09 05:37:58.781806,treatment,new_page,0
773192,2017-01-14 02:55:59.590927,treatment,new_page,0
719014,2017-01-17 01:48:29.539573,control,old_page,0
";

/// Temporary working directory with fixture files.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Creates a workspace containing `raw.csv`.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("raw.csv"), RAW_CSV).unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn path_str(&self, name: &str) -> String {
        self.path(name).to_string_lossy().into_owned()
    }

    /// Writes a config file pointing `paths.raw`/`paths.clean` into the workspace.
    pub fn write_config(&self, extra: &str) -> String {
        let config = format!(
            "[paths]\nraw = {:?}\nclean = {:?}\n{extra}",
            self.path_str("raw.csv"),
            self.path_str("clean.csv"),
        );
        let path = self.path("abtest.toml");
        std::fs::write(&path, config).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Writes a cleaned dataset with the given per-group counts.
    pub fn write_clean(&self, control: (u64, u64), treatment: (u64, u64)) -> String {
        let mut csv = String::from("user_id,group,landing_page,converted\n");
        let mut id = 0u64;
        for (group, page, (converted, total)) in [
            ("control", "old_page", control),
            ("treatment", "new_page", treatment),
        ] {
            for k in 0..total {
                id += 1;
                csv.push_str(&format!("{id},{group},{page},{}\n", u8::from(k < converted)));
            }
        }
        let path = self.path("clean.csv");
        std::fs::write(&path, csv).unwrap();
        path.to_string_lossy().into_owned()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `args` (without the binary name) and run, returning stdout.
///
/// Without an explicit `--config`, an empty config file in a fresh
/// temporary directory is used, so the developer's own configuration
/// never leaks into a test.
pub fn run_cli(args: &[&str]) -> abtest_core::Result<String> {
    let isolated = TempDir::new().unwrap();
    let config = isolated.path().join("abtest.toml");
    std::fs::write(&config, "").unwrap();
    let config = config.to_string_lossy().into_owned();

    let mut argv = vec!["abtest"];
    if !args.contains(&"--config") {
        argv.extend(["--config", config.as_str()]);
    }
    argv.extend(args.iter().copied());

    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    let mut out = Vec::new();
    abtest_cli::run(cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

/// Output of the compiled `abtest` binary.
pub struct BinOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run the `abtest` binary inside `ws` with `envs` set.
///
/// `HOME` and `XDG_CONFIG_HOME` point into the workspace and `RUST_LOG` and
/// `ABTEST_CONFIG` are cleared unless given in `envs`.
pub fn run_bin(ws: &Workspace, args: &[&str], envs: &[(&str, &str)]) -> BinOutput {
    let home = ws.path("home");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_abtest"));
    cmd.current_dir(ws.dir.path())
        .env_remove("RUST_LOG")
        .env_remove("ABTEST_CONFIG")
        .env("NO_COLOR", "1")
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .args(args);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    let output = cmd.output().unwrap();
    BinOutput {
        status: output.status.code(),
        stdout: String::from_utf8(output.stdout).unwrap(),
        stderr: String::from_utf8(output.stderr).unwrap(),
    }
}
