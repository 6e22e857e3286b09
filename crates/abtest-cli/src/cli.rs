//! Command-line argument definitions.

use std::path::PathBuf;

use abtest_core::config::ExperimentConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// abtest - conversion-rate A/B test analysis
#[derive(Parser, Debug)]
#[command(name = "abtest", author, version)]
#[command(about = "Clean experiment data and evaluate conversion A/B tests", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drop misaligned rows and duplicate users from a raw export
    Wrangle {
        /// Raw CSV (defaults to paths.raw)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Cleaned CSV destination (defaults to paths.clean)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report conversions for one group, or for control and treatment
    Report {
        /// Group label to report on
        #[arg(short, long)]
        group: Option<String>,
        /// Cleaned CSV (defaults to paths.clean)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Compute the required sample size per group
    SampleSize {
        #[command(flatten)]
        experiment: ExperimentArgs,
    },
    /// Check whether group sizes are large enough for hypothesis testing
    Check {
        /// Users in the control group
        #[arg(long)]
        control: u64,
        /// Users in the treatment group
        #[arg(long)]
        treatment: u64,
        #[command(flatten)]
        experiment: ExperimentArgs,
    },
    /// Confidence interval for the treatment - control difference
    Ci {
        /// Converted users in the control group
        #[arg(long)]
        control_conversions: u64,
        /// Converted users in the treatment group
        #[arg(long)]
        treatment_conversions: u64,
        /// Users in the control group
        #[arg(long)]
        control_users: u64,
        /// Users in the treatment group
        #[arg(long)]
        treatment_users: u64,
        /// Significance level (defaults to experiment.alpha)
        #[arg(long)]
        alpha: Option<f64>,
    },
    /// Run the full analysis on a cleaned dataset
    Analyze {
        /// Cleaned CSV (defaults to paths.clean)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        experiment: ExperimentArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for the `[experiment]` config section.
#[derive(Args, Debug, Clone, Default)]
pub struct ExperimentArgs {
    /// Baseline conversion rate
    #[arg(long)]
    pub baseline: Option<f64>,
    /// Minimum change to the baseline rate worth detecting
    #[arg(long)]
    pub practical_significance: Option<f64>,
    /// Significance level
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Statistical power
    #[arg(long)]
    pub power: Option<f64>,
}

impl ExperimentArgs {
    /// Layer these overrides on top of the configured values.
    pub fn apply(&self, experiment: &mut ExperimentConfig) {
        if let Some(baseline) = self.baseline {
            experiment.baseline_rate = Some(baseline);
        }
        if let Some(ps) = self.practical_significance {
            experiment.practical_significance = ps;
        }
        if let Some(alpha) = self.alpha {
            experiment.alpha = alpha;
        }
        if let Some(power) = self.power {
            experiment.power = power;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Get a value by dotted key (e.g. experiment.alpha)
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Destination (defaults to the platform config directory)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as docker --env flags
        #[arg(long)]
        docker_env: bool,
    },
}
