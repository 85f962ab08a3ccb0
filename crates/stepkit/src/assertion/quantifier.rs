//! Validations over collections of values.
//!
//! Per-item comparison failures are aggregated by the combinator; any other
//! error (bad operand, missing memory key) stops evaluation immediately.

use crate::grammar::{NormalizedValidation, Operator};
use crate::result::{StepError, StepResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::trace;

/// How `all of` treats its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllOfMode {
    /// Passes as soon as one candidate passes; fails only when all fail
    #[default]
    FirstMatch,
    /// Every candidate must pass; failures are reported together
    Every,
}

/// Run one validation, turning an assertion failure into `Ok(Some(error))`
fn attempt(
    validation: &NormalizedValidation,
    actual: &Value,
    expected: &Value,
) -> StepResult<Option<StepError>> {
    match validation.validate(actual, expected) {
        Ok(()) => Ok(None),
        Err(e) if e.is_assertion() => Ok(Some(e)),
        Err(e) => Err(e),
    }
}

fn joined(errors: &[StepError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Every value must pass; the first failure is returned as is
pub fn every_element(
    values: &[Value],
    expected: &Value,
    validation: &NormalizedValidation,
) -> StepResult<()> {
    for value in values {
        trace!(value = %value.inspect(), "every element");
        validation.validate(value, expected)?;
    }
    Ok(())
}

/// At least `n` values must pass
pub fn at_least_n(
    n: usize,
    values: &[Value],
    expected: &Value,
    validation: &NormalizedValidation,
) -> StepResult<()> {
    let mut passed = 0;
    for value in values {
        if attempt(validation, value, expected)?.is_none() {
            passed += 1;
        }
    }
    trace!(n, passed, total = values.len(), "at least n");
    if passed < n {
        return Err(StepError::assertion(
            format!("Less than {n} pass {validation} verification"),
            format!("{passed} of {} passed", values.len()),
            n.to_string(),
        ));
    }
    Ok(())
}

/// `actual` must pass against at least one candidate
pub fn any_of(actual: &Value, candidates: &[Value], validation: &NormalizedValidation) -> StepResult<()> {
    let mut failures = Vec::new();
    for candidate in candidates {
        match attempt(validation, actual, candidate)? {
            None => return Ok(()),
            Some(failure) => failures.push(failure),
        }
    }
    Err(StepError::assertion(
        joined(&failures),
        actual.inspect(),
        Value::Array(candidates.to_vec()).inspect(),
    ))
}

/// `actual` against every candidate, according to `mode`
pub fn all_of(
    actual: &Value,
    candidates: &[Value],
    validation: &NormalizedValidation,
    mode: AllOfMode,
) -> StepResult<()> {
    let mut failures = Vec::new();
    for candidate in candidates {
        match attempt(validation, actual, candidate)? {
            None if mode == AllOfMode::FirstMatch => return Ok(()),
            None => {}
            Some(failure) => failures.push(failure),
        }
    }
    if failures.is_empty() {
        return Ok(());
    }
    Err(StepError::assertion(
        joined(&failures),
        actual.inspect(),
        Value::Array(candidates.to_vec()).inspect(),
    ))
}

/// `array` must already be in the order `comparator` sorts it into.
///
/// The comparator is called with two items and returns a negative, zero or
/// positive number. `array_name` and `comparator_name` appear in errors.
pub fn sorted_by(
    array: &Value,
    array_name: &str,
    comparator: &Value,
    comparator_name: &str,
) -> StepResult<()> {
    let Value::Array(items) = array else {
        return Err(StepError::type_error(format!("'{array_name}' is not an array")));
    };
    let Value::Function(compare) = comparator else {
        return Err(StepError::type_error(format!("'{comparator_name}' is not implemented")));
    };

    let mut sorted = items.clone();
    let mut failure = None;
    sorted.sort_by(|a, b| match compare.call(&[a.clone(), b.clone()]) {
        Ok(result) => result.to_number().partial_cmp(&0.0).unwrap_or(Ordering::Equal),
        Err(e) => {
            failure.get_or_insert(e);
            Ordering::Equal
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }
    super::compare(Operator::DeeplyEqual, array, &Value::Array(sorted), false)
}
