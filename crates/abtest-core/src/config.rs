//! Configuration for abtest.
//!
//! Configuration lives in a TOML file. Every field has a default, so a
//! missing file simply means "use the defaults":
//!
//! ```toml
//! [columns]
//! user = "user_id"
//! group = "group"
//! page = "landing_page"
//! converted = "converted"
//!
//! [assignment]
//! control_group = "control"
//! treatment_group = "treatment"
//! control_page = "old_page"
//! treatment_page = "new_page"
//!
//! [experiment]
//! practical_significance = 0.01
//! alpha = 0.05
//! power = 0.8
//!
//! [paths]
//! raw = "data/raw/ab_data.csv"
//! clean = "data/interim/df_conversion_clean.csv"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::dataset::ColumnNames;
use crate::error::{Error, Result};
use crate::power::{DEFAULT_ALPHA, DEFAULT_POWER, DEFAULT_PRACTICAL_SIGNIFICANCE, SampleSizeParams};
use crate::wrangle::Assignment;

/// Environment variable that points at a config file.
pub const CONFIG_ENV_VAR: &str = "ABTEST_CONFIG";

/// Behaviour shared by TOML-backed configuration types.
pub trait ConfigManager: Serialize + DeserializeOwned + Default {
    /// Project name, used for the config directory and env var prefix.
    fn project_name() -> &'static str;

    /// Environment variable that overrides the config location.
    fn config_env_var() -> &'static str;

    /// `<platform config dir>/<project>/config.toml`.
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::project_name()).join("config.toml"))
    }

    /// Resolve the config file location.
    ///
    /// Checks in order:
    /// 1. The explicit path, if given
    /// 2. The config env var
    /// 3. [`ConfigManager::default_config_path`]
    fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(Self::config_env_var())
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Load from the resolved path, falling back to defaults when absent.
    ///
    /// A missing explicit path is logged as a warning, since it is usually a typo.
    fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) if explicit.is_some() => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific file.
    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Serialize as pretty TOML.
    fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Flatten into `PROJECT_SECTION_KEY=value` pairs.
    fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self)?;
        let prefix = Self::project_name().to_uppercase().replace(['-', ' '], "_");
        let mut vars = Vec::new();
        flatten_env(&prefix, &value, &mut vars);
        Ok(vars)
    }
}

fn flatten_env(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let name = format!("{prefix}_{}", key.to_uppercase());
                flatten_env(&name, child, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Array(items) => {
            let joined = items
                .iter()
                .map(|v| match v {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            out.push((prefix.to_string(), joined));
        }
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// Statistical settings for an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Baseline conversion rate; the observed control rate when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_rate: Option<f64>,
    /// Smallest change to the baseline rate worth detecting.
    pub practical_significance: f64,
    /// Significance level.
    pub alpha: f64,
    /// Target power.
    pub power: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            baseline_rate: None,
            practical_significance: DEFAULT_PRACTICAL_SIGNIFICANCE,
            alpha: DEFAULT_ALPHA,
            power: DEFAULT_POWER,
        }
    }
}

impl ExperimentConfig {
    /// Sample size parameters, using `fallback_baseline` when no baseline is configured.
    pub fn sample_size_params(&self, fallback_baseline: f64) -> SampleSizeParams {
        SampleSizeParams::new(self.baseline_rate.unwrap_or(fallback_baseline))
            .with_practical_significance(self.practical_significance)
            .with_alpha(self.alpha)
            .with_power(self.power)
    }
}

/// Default input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw experiment export.
    pub raw: PathBuf,
    /// Cleaned dataset written by `wrangle` and read by the analysis.
    pub clean: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("data/raw/ab_data.csv"),
            clean: PathBuf::from("data/interim/df_conversion_clean.csv"),
        }
    }
}

/// Top-level abtest configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbConfig {
    /// CSV column names.
    pub columns: ColumnNames,
    /// Expected group/page pairing.
    pub assignment: Assignment,
    /// Statistical settings.
    pub experiment: ExperimentConfig,
    /// File locations.
    pub paths: PathsConfig,
}

impl ConfigManager for AbConfig {
    fn project_name() -> &'static str {
        "abtest"
    }

    fn config_env_var() -> &'static str {
        CONFIG_ENV_VAR
    }
}
