//! Handlers for the analysis subcommands.

use std::io::Write;
use std::path::Path;

use abtest_core::config::{AbConfig, ConfigManager};
use abtest_core::{
    Dataset, Error, Result, SampleSizeParams, ab_test_ci, analyze, check_sample_sizes, clean,
    report_conversions,
};
use serde::Serialize;
use serde_json::json;

use crate::cli::{Cli, Command, ExperimentArgs, OutputFormat};
use crate::config_handlers::handle_config_command;

/// Exit status for a failure caused by the input data.
pub const EXIT_DATA_ERROR: u8 = 2;

/// Exit status for any other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Process exit status for a failed command.
///
/// Problems with the CSV data (missing columns, bad values, misaligned
/// groups) are told apart from usage, config and I/O failures.
pub fn exit_status(err: &Error) -> u8 {
    if err.is_data_error() {
        EXIT_DATA_ERROR
    } else {
        EXIT_FAILURE
    }
}

/// Execute a parsed command line, writing results to `out`.
pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config_path = cli.config.as_deref();
    let format = cli.format;
    let load = || AbConfig::load(config_path);

    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action, out),
        Command::Wrangle { input, output } => {
            cmd_wrangle(&load()?, input.as_deref(), output.as_deref(), format, out)
        }
        Command::Report { group, input } => {
            cmd_report(&load()?, group.as_deref(), input.as_deref(), format, out)
        }
        Command::SampleSize { experiment } => {
            let config = with_overrides(load()?, &experiment);
            cmd_sample_size(&config, format, out)
        }
        Command::Check {
            control,
            treatment,
            experiment,
        } => {
            let config = with_overrides(load()?, &experiment);
            cmd_check(&config, control, treatment, format, out)
        }
        Command::Ci {
            control_conversions,
            treatment_conversions,
            control_users,
            treatment_users,
            alpha,
        } => {
            let alpha = match alpha {
                Some(alpha) => alpha,
                None => load()?.experiment.alpha,
            };
            let ci = ab_test_ci(
                control_conversions,
                treatment_conversions,
                control_users,
                treatment_users,
                alpha,
            )?;
            emit(out, format, &ci)
        }
        Command::Analyze { input, experiment } => {
            let config = with_overrides(load()?, &experiment);
            cmd_analyze(&config, input.as_deref(), format, out)
        }
    }
}

fn with_overrides(mut config: AbConfig, args: &ExperimentArgs) -> AbConfig {
    args.apply(&mut config.experiment);
    config
}

/// Clean a raw export and write the result.
pub fn cmd_wrangle<W: Write>(
    config: &AbConfig,
    input: Option<&Path>,
    output: Option<&Path>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let input = input.unwrap_or(config.paths.raw.as_path());
    let output = output.unwrap_or(config.paths.clean.as_path());

    let raw = Dataset::from_path(input, &config.columns)?;
    let (cleaned, summary) = clean(&raw, &config.assignment);
    cleaned.write_path(output)?;

    match format {
        OutputFormat::Text => {
            writeln!(out, "{summary}")?;
            writeln!(out, "Wrote {}", output.display())?;
            Ok(())
        }
        OutputFormat::Json => write_json(
            out,
            &json!({ "summary": summary, "output": output }),
        ),
    }
}

/// Report conversions for one group, or both configured groups.
pub fn cmd_report<W: Write>(
    config: &AbConfig,
    group: Option<&str>,
    input: Option<&Path>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let dataset = load_clean(config, input)?;
    let groups = match group {
        Some(g) => vec![g],
        None => vec![
            config.assignment.control_group.as_str(),
            config.assignment.treatment_group.as_str(),
        ],
    };
    let reports = groups
        .into_iter()
        .map(|g| report_conversions(&dataset, g))
        .collect::<Result<Vec<_>>>()?;

    match format {
        OutputFormat::Text => {
            for report in &reports {
                writeln!(out, "{report}")?;
                writeln!(
                    out,
                    "  conversions: {} / {} ({})",
                    report.conversions, report.total_users, report.rate
                )?;
            }
            Ok(())
        }
        OutputFormat::Json => write_json(out, &reports),
    }
}

/// Print the required sample size per group.
pub fn cmd_sample_size<W: Write>(
    config: &AbConfig,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let params = configured_params(config)?;
    let required = params.required_sample_size()?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "Required sample size: {} per group", required.round())?;
            Ok(())
        }
        OutputFormat::Json => write_json(
            out,
            &json!({ "params": params, "required_sample_size": required }),
        ),
    }
}

/// Compare group sizes against the required sample size.
pub fn cmd_check<W: Write>(
    config: &AbConfig,
    control: u64,
    treatment: u64,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let params = configured_params(config)?;
    let check = check_sample_sizes(control, treatment, &params)?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "Required sample size: {} per group", check.required.round())?;
            writeln!(out, "{}", check.verdict)?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &check),
    }
}

/// Run the full analysis on the cleaned dataset.
pub fn cmd_analyze<W: Write>(
    config: &AbConfig,
    input: Option<&Path>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let dataset = load_clean(config, input)?;
    let report = analyze(&dataset, config)?;
    emit(out, format, &report)
}

fn load_clean(config: &AbConfig, input: Option<&Path>) -> Result<Dataset> {
    let path = input.unwrap_or(config.paths.clean.as_path());
    Dataset::from_path(path, &config.columns)
}

fn configured_params(config: &AbConfig) -> Result<SampleSizeParams> {
    let baseline = config.experiment.baseline_rate.ok_or_else(|| {
        Error::validation_field(
            "baseline_rate",
            format!(
                "no baseline rate; pass --baseline or set experiment.baseline_rate with `{} config set`",
                AbConfig::project_name()
            ),
        )
    })?;
    Ok(config.experiment.sample_size_params(baseline))
}

fn emit<W, T>(out: &mut W, format: OutputFormat, value: &T) -> Result<()>
where
    W: Write,
    T: Serialize + std::fmt::Display,
{
    match format {
        OutputFormat::Text => {
            writeln!(out, "{value}")?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, value),
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
