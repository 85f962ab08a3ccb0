//! Stepkit CLI Library
//!
//! Command-line front end for the stepkit engine: normalize phrases,
//! resolve page-object paths and run one-off validations.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{CheckArgs, Cli, ColorArg, Commands, FormatArg, PhraseArgs, ResolveArgs};
pub use config::{CliConfig, ColorChoice, OutputFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
