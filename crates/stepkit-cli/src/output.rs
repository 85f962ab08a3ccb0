//! Output formatting

use crate::config::{CliConfig, OutputFormat};
use crate::error::CliResult;
use console::{style, Term};
use serde::Serialize;

/// Writes command results to stdout and diagnostics to stderr
#[derive(Debug)]
pub struct Reporter {
    out: Term,
    err: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Result format
    pub format: OutputFormat,
}

impl Reporter {
    /// Create a reporter for the given configuration
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            use_color: config.color.should_color(),
            quiet: config.verbosity.is_quiet(),
            format: config.format,
        }
    }

    /// Emit a result: JSON in JSON mode, otherwise the text lines
    pub fn result<T: Serialize>(&self, value: &T, lines: &[String]) -> CliResult<()> {
        match self.format {
            OutputFormat::Json => {
                self.out.write_line(&serde_json::to_string_pretty(value)?)?;
            }
            OutputFormat::Text => {
                for line in lines {
                    self.out.write_line(line)?;
                }
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet || self.format == OutputFormat::Json {
            return;
        }
        let _ = self.err.write_line(&format!("{} {message}", self.mark("✓", "PASS", true)));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let _ = self.err.write_line(&format!("{} {message}", self.mark("✗", "FAIL", false)));
    }

    /// Label/value line for text output
    #[must_use]
    pub fn field(&self, label: &str, value: impl std::fmt::Display) -> String {
        if self.use_color {
            format!("{} {value}", style(format!("{label}:")).cyan())
        } else {
            format!("{label}: {value}")
        }
    }

    fn mark(&self, symbol: &str, plain: &str, ok: bool) -> String {
        if !self.use_color {
            return plain.to_string();
        }
        if ok {
            style(symbol).green().bold().to_string()
        } else {
            style(symbol).red().bold().to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    fn plain() -> Reporter {
        Reporter::new(&CliConfig::new().with_color(ColorChoice::Never))
    }

    #[test]
    fn test_plain_field() {
        assert_eq!(plain().field("operator", "equal"), "operator: equal");
    }

    #[test]
    fn test_plain_marks() {
        let reporter = plain();
        assert_eq!(reporter.mark("✓", "PASS", true), "PASS");
        assert_eq!(reporter.mark("✗", "FAIL", false), "FAIL");
    }

    #[test]
    fn test_quiet_and_format_follow_config() {
        let config = CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_format(OutputFormat::Json);
        let reporter = Reporter::new(&config);
        assert!(reporter.quiet);
        assert_eq!(reporter.format, OutputFormat::Json);
    }
}
