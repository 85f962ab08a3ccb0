//! Stepkit CLI: inspect step phrases and run validations
//!
//! ## Usage
//!
//! ```bash
//! stepkit validation "does not softly contain"
//! stepkit condition "not to be visible"
//! stepkit resolve "Todo List > Item(2)" --page-object po.yaml
//! stepkit check '$total' "to be above" 10 --memory memory.yaml
//! stepkit params --format json
//! ```

use clap::Parser;
use std::process::ExitCode;
use stepkit_cli::{handlers, Cli, CliConfig, CliResult, Commands, Reporter, Verbosity};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);
    let reporter = Reporter::new(&config);

    match run(&reporter, &cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            reporter.failure(&format!("Error: {e}"));
            ExitCode::from(2)
        }
    }
}

fn run(reporter: &Reporter, command: &Commands) -> CliResult<bool> {
    match command {
        Commands::Validation(args) => handlers::run_validation(reporter, args),
        Commands::Condition(args) => handlers::run_condition(reporter, args),
        Commands::Resolve(args) => handlers::run_resolve(reporter, args),
        Commands::Check(args) => handlers::run_check(reporter, args),
        Commands::Params => handlers::run_params(reporter),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_format(cli.format.into())
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
