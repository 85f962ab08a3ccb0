//! Command handlers.
//!
//! Each command builds a serializable report first so the text and JSON
//! renderings stay in step.

use crate::commands::{CheckArgs, PhraseArgs, ResolveArgs};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use serde::Serialize;
use std::path::Path;
use stepkit::{
    parameter_types, steps, EngineConfig, LocatorToken, Memory, MockDriver, NormalizedCondition,
    NormalizedValidation, PageObject, ParameterType, StepError, ValueToken, World,
};
use tracing::{debug, info};

/// Normalized validation phrase
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Phrase as given
    pub phrase: String,
    /// Parsed validation
    pub validation: NormalizedValidation,
    /// Canonical phrase
    pub canonical: String,
}

/// Normalized condition phrase
#[derive(Debug, Clone, Serialize)]
pub struct ConditionReport {
    /// Phrase as given
    pub phrase: String,
    /// Parsed condition
    pub condition: NormalizedCondition,
    /// Canonical phrase
    pub canonical: String,
}

/// Resolved page-object path
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    /// Path after placeholder interpolation
    pub path: String,
    /// Rendered locator
    pub locator: String,
    /// Selectors from outermost to innermost
    pub chain: Vec<String>,
}

/// Outcome of a check
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Resolved actual value
    pub actual: String,
    /// Canonical validation phrase
    pub validation: String,
    /// Resolved expected value
    pub expected: String,
    /// Whether the validation held
    pub passed: bool,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading engine config");
            EngineConfig::from_path(path).map_err(|e| CliError::config(format!("{}: {e}", path.display())))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load_memory(path: Option<&Path>) -> CliResult<Memory> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading memory");
            Ok(Memory::from_path(path)?)
        }
        None => Ok(Memory::new()),
    }
}

/// Parse a validation phrase
pub fn validation_report(args: &PhraseArgs) -> CliResult<ValidationReport> {
    let validation = NormalizedValidation::parse(&args.phrase)?;
    Ok(ValidationReport {
        phrase: args.phrase.clone(),
        canonical: validation.to_phrase(),
        validation,
    })
}

/// Parse a condition phrase
pub fn condition_report(args: &PhraseArgs) -> CliResult<ConditionReport> {
    let condition = NormalizedCondition::parse(&args.phrase)?;
    Ok(ConditionReport {
        phrase: args.phrase.clone(),
        canonical: condition.to_phrase(),
        condition,
    })
}

/// Resolve a path against a page-object file
pub fn resolve_report(args: &ResolveArgs) -> CliResult<ResolveReport> {
    if args.path.trim().is_empty() {
        return Err(CliError::invalid_argument("alias path must not be empty"));
    }
    let page_object = PageObject::from_path(&args.page_object)?;
    let memory = load_memory(args.memory.as_deref())?;
    let world = World::new(page_object, Box::new(MockDriver::new())).with_memory(memory);
    let locator = world.element(&LocatorToken::new(&args.path))?;
    info!(path = %locator.path(), "resolved locator");
    Ok(ResolveReport {
        path: locator.path().to_string(),
        locator: locator.to_string(),
        chain: locator.chain().iter().map(ToString::to_string).collect(),
    })
}

/// Run a validation between two memory expressions.
///
/// A failed comparison is a report with `passed: false`; resolution and
/// type errors are returned as errors.
pub fn check_report(args: &CheckArgs) -> CliResult<CheckReport> {
    let memory = load_memory(args.memory.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    let validation = NormalizedValidation::parse(&args.validation)?;
    let actual = ValueToken::new(&args.actual);
    let expected = ValueToken::new(&args.expected);

    let mut world = World::new(PageObject::new(), Box::new(MockDriver::new()))
        .with_memory(memory)
        .with_config(config);
    let actual_value = world.value(&actual)?;
    let expected_value = world.value(&expected)?;
    let outcome = steps::validation::expect_value(&mut world, &actual, &validation, &expected)
        .and_then(|()| world.verify_soft());

    let message = match outcome {
        Ok(()) => None,
        Err(e @ (StepError::Assertion { .. } | StepError::SoftAssertions { .. })) => Some(e.to_string()),
        Err(e) => return Err(e.into()),
    };
    Ok(CheckReport {
        actual: actual_value.inspect(),
        validation: validation.to_phrase(),
        expected: expected_value.inspect(),
        passed: message.is_none(),
        message,
    })
}

/// `stepkit validation`
pub fn run_validation(reporter: &Reporter, args: &PhraseArgs) -> CliResult<bool> {
    let report = validation_report(args)?;
    let v = &report.validation;
    let lines = vec![
        reporter.field("operator", v.operator),
        reporter.field("negated", v.negated),
        reporter.field("soft", v.soft),
        reporter.field("canonical", &report.canonical),
    ];
    reporter.result(&report, &lines)?;
    Ok(true)
}

/// `stepkit condition`
pub fn run_condition(reporter: &Reporter, args: &PhraseArgs) -> CliResult<bool> {
    let report = condition_report(args)?;
    let lines = vec![
        reporter.field("condition", report.condition.kind),
        reporter.field("negated", report.condition.negated),
        reporter.field("canonical", &report.canonical),
    ];
    reporter.result(&report, &lines)?;
    Ok(true)
}

/// `stepkit resolve`
pub fn run_resolve(reporter: &Reporter, args: &ResolveArgs) -> CliResult<bool> {
    let report = resolve_report(args)?;
    let mut lines = vec![
        reporter.field("path", &report.path),
        reporter.field("locator", &report.locator),
    ];
    lines.extend(
        report
            .chain
            .iter()
            .enumerate()
            .map(|(i, selector)| format!("  {}. {selector}", i + 1)),
    );
    reporter.result(&report, &lines)?;
    Ok(true)
}

/// `stepkit check`
pub fn run_check(reporter: &Reporter, args: &CheckArgs) -> CliResult<bool> {
    let report = check_report(args)?;
    let summary = format!("{} {} {}", report.actual, report.validation, report.expected);
    match &report.message {
        None => reporter.success(&summary),
        Some(message) => reporter.failure(message),
    }
    let lines = vec![
        reporter.field("actual", &report.actual),
        reporter.field("validation", &report.validation),
        reporter.field("expected", &report.expected),
        reporter.field("passed", report.passed),
    ];
    reporter.result(&report, &lines)?;
    Ok(report.passed)
}

/// `stepkit params`
pub fn run_params(reporter: &Reporter) -> CliResult<bool> {
    let params: Vec<ParameterType> = parameter_types();
    let lines: Vec<String> = params.iter().map(|p| reporter.field(p.name, &p.regexp)).collect();
    reporter.result(&params, &lines)?;
    Ok(true)
}
