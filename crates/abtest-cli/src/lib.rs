//! # abtest-cli
//!
//! Command-line front end for the abtest core library:
//! - `wrangle`: clean a raw experiment export
//! - `report`, `sample-size`, `check`, `ci`: the individual analysis steps
//! - `analyze`: the whole evaluation in one pass
//! - `config`: inspect and edit the TOML configuration

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;
pub mod logging;

pub use cli::{Cli, OutputFormat};
pub use commands::run;
