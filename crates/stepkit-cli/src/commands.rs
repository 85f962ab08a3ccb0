//! CLI command definitions using clap

use crate::config::{ColorChoice, OutputFormat};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stepkit: inspect step phrases, page-object paths and validations
#[derive(Parser, Debug)]
#[command(name = "stepkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Result format (text, json)
    #[arg(long, default_value = "text", global = true)]
    pub format: FormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a validation phrase such as "to not be softly above"
    Validation(PhraseArgs),

    /// Normalize a condition phrase such as "not to be visible"
    Condition(PhraseArgs),

    /// Resolve a page-object path to its selector chain
    Resolve(ResolveArgs),

    /// Resolve two values from memory and run a validation
    Check(CheckArgs),

    /// List the step parameter types and their patterns
    Params,
}

/// A single phrase to parse
#[derive(Parser, Debug)]
pub struct PhraseArgs {
    /// Phrase text, without surrounding quotes
    pub phrase: String,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Alias path, e.g. "Todo List > Item(2)"
    pub path: String,

    /// Page-object YAML file
    #[arg(short, long)]
    pub page_object: PathBuf,

    /// Memory YAML file used for `{$key}` placeholders in the path
    #[arg(short, long)]
    pub memory: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Actual value expression, e.g. "$total"
    pub actual: String,

    /// Validation phrase, e.g. "to be above"
    pub validation: String,

    /// Expected value expression
    pub expected: String,

    /// Memory YAML file
    #[arg(short, long)]
    pub memory: Option<PathBuf>,

    /// Engine configuration YAML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Always use colors
    Always,
    /// Auto-detect
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Always => Self::Always,
            ColorArg::Auto => Self::Auto,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
