//! Handlers for the `config` subcommands.
//!
//! The `cmd_config_*` functions are generic over [`ConfigManager`] and write
//! their output to the supplied writer. The TOML dotted-key helpers at the
//! bottom work on any `toml::Value` tree.

use std::io::Write;
use std::path::PathBuf;

use abtest_core::config::{AbConfig, ConfigManager};
use abtest_core::{Error, Result};

use crate::cli::ConfigAction;

/// Dispatch a config subcommand against [`AbConfig`].
pub fn handle_config_command<W: Write>(
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut W,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path::<AbConfig, _>(config_path, out),
        ConfigAction::Get { key } => cmd_config_get::<AbConfig, _>(config_path, &key, out),
        ConfigAction::Set { key, value } => {
            cmd_config_set::<AbConfig, _>(config_path, &key, &value, out)
        }
        ConfigAction::Init { file, force } => {
            cmd_config_init::<AbConfig, _>(file.as_deref().or(config_path), force, out)
        }
        ConfigAction::Export { docker_env } => {
            let config = AbConfig::load(config_path)?;
            cmd_config_export(&config, docker_env, out)
        }
    }
}

/// Print the resolved config file path.
pub fn cmd_config_path<C: ConfigManager, W: Write>(
    config_path: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let path = C::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("Could not determine config directory for this platform")
    })?;
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        tracing::warn!(
            "config file does not exist; run `{} config init` to create it",
            C::project_name()
        );
    }
    Ok(())
}

/// Print a configuration value by dotted key.
pub fn cmd_config_get<C: ConfigManager, W: Write>(
    config_path: Option<&str>,
    key: &str,
    out: &mut W,
) -> Result<()> {
    let config = C::load(config_path)?;
    let value = toml::Value::try_from(&config)?;
    let found = get_nested_value(&value, key)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
    writeln!(out, "{}", format_toml_value(found))?;
    Ok(())
}

/// Set a configuration value by dotted key in an existing config file.
///
/// The edited document must still deserialize into `C`, so a mistyped
/// value (say, a string for `experiment.alpha`) is rejected before writing.
pub fn cmd_config_set<C: ConfigManager, W: Write>(
    config_path: Option<&str>,
    key: &str,
    value: &str,
    out: &mut W,
) -> Result<()> {
    let path = C::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            C::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;

    let toml_str = edited_document::<C>(doc, key, value)?;
    std::fs::write(&path, toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    tracing::info!(key, value, path = %path.display(), "updated config");
    writeln!(out, "Set {key} = {value} in {}", path.display())?;
    Ok(())
}

/// Apply `key = value` to `doc` and render it, checking it still loads as `C`.
///
/// Keys that already hold a string keep the raw text, so labels such as
/// `1` or `true` stay strings. A typed value the schema rejects is retried
/// as a string before giving up.
fn edited_document<C: ConfigManager>(
    mut doc: toml::Value,
    key: &str,
    value: &str,
) -> Result<String> {
    let typed = match get_nested_value(&doc, key) {
        Some(toml::Value::String(_)) => toml::Value::String(value.to_string()),
        _ => parse_value(value),
    };
    let retry = (!typed.is_str()).then(|| doc.clone());

    set_nested_value(&mut doc, key, typed)?;
    let toml_str = toml::to_string_pretty(&doc)?;
    let err = match toml::from_str::<C>(&toml_str) {
        Ok(_) => return Ok(toml_str),
        Err(e) => e,
    };

    if let Some(mut doc) = retry {
        set_nested_value(&mut doc, key, toml::Value::String(value.to_string()))?;
        let toml_str = toml::to_string_pretty(&doc)?;
        if toml::from_str::<C>(&toml_str).is_ok() {
            return Ok(toml_str);
        }
    }
    Err(Error::config(format!("Invalid value for '{key}': {err}")))
}

/// Write a default configuration file.
///
/// The destination is `file` when given, otherwise the resolved config path.
pub fn cmd_config_init<C: ConfigManager, W: Write>(
    file: Option<&str>,
    force: bool,
    out: &mut W,
) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => C::resolve_config_path(None)
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = C::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

/// Print the configuration as environment variables.
pub fn cmd_config_export<C: ConfigManager, W: Write>(
    config: &C,
    docker_env: bool,
    out: &mut W,
) -> Result<()> {
    for (key, value) in config.to_env_vars()? {
        if docker_env {
            writeln!(out, "--env {key}={value}")?;
        } else {
            writeln!(out, "{key}={value}")?;
        }
    }
    Ok(())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Look up a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = match parts.pop() {
        Some(last) if !last.is_empty() => last,
        _ => return Err(Error::config("Empty key path")),
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Parse a command-line string into a TOML value.
///
/// Priority: bool, then integer, then float, then string.
pub fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| s.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

/// Render a TOML value for stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
        other => other.to_string(),
    }
}
