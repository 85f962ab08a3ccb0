//! Comparator dispatch.
//!
//! [`NormalizedValidation::validate`] runs the operator's predicate on two
//! resolved values, negates it when asked, and reports a failed comparison
//! as [`StepError::Assertion`]. Operands of the wrong kind are
//! [`StepError::Type`] errors and are never negated away.

mod quantifier;
mod retry;
mod soft;

pub use quantifier::{all_of, any_of, at_least_n, every_element, sorted_by, AllOfMode};
pub use retry::{RetryConfig, RetryResult};
pub use soft::{AssertionFailure, AssertionSummary, SoftAssertions};

use crate::grammar::{NormalizedValidation, Operator};
use crate::result::{StepError, StepResult};
use crate::value::{format_number, Pattern, Value};
use tracing::debug;

/// Outcome of a predicate before negation
struct Verdict {
    passed: bool,
    /// Message for the positive form, with `{not}` marking where negation goes
    message: String,
}

impl Verdict {
    fn new(passed: bool, message: String) -> Self {
        Self { passed, message }
    }
}

impl NormalizedValidation {
    /// Validate `actual` against `expected`
    pub fn validate(&self, actual: &Value, expected: &Value) -> StepResult<()> {
        compare(self.operator, actual, expected, self.negated)
    }
}

/// Run an operator's predicate, negated when `negated` is set
pub fn compare(operator: Operator, actual: &Value, expected: &Value, negated: bool) -> StepResult<()> {
    let verdict = evaluate(operator, actual, expected)?;
    debug!(%operator, negated, passed = verdict.passed, "compared values");
    if verdict.passed != negated {
        return Ok(());
    }
    let not = if negated { "not " } else { "" };
    Err(StepError::assertion(
        verdict.message.replace("{not}", not),
        actual.inspect(),
        expected.inspect(),
    ))
}

fn evaluate(operator: Operator, actual: &Value, expected: &Value) -> StepResult<Verdict> {
    let (a, e) = (actual.inspect(), expected.inspect());
    let verdict = match operator {
        Operator::Equal => Verdict::new(actual.loose_eq(expected), format!("expected {a} to {{not}}equal {e}")),
        Operator::StrictlyEqual => Verdict::new(
            actual.strict_eq(expected),
            format!("expected {a} to {{not}}strictly equal {e}"),
        ),
        Operator::DeeplyEqual => Verdict::new(
            actual.deep_eq(expected),
            format!("expected {a} to {{not}}deeply equal {e}"),
        ),
        Operator::HaveMembers => {
            let (have, want) = (array_operand(actual)?, array_operand(expected)?);
            Verdict::new(
                have.len() == want.len() && is_superset(have, want),
                format!("expected {a} to {{not}}have the same members as {e}"),
            )
        }
        Operator::IncludeMembers => {
            let (have, want) = (array_operand(actual)?, array_operand(expected)?);
            Verdict::new(is_superset(have, want), format!("expected {a} to {{not}}be a superset of {e}"))
        }
        Operator::HaveProperty => {
            if matches!(actual, Value::Undefined | Value::Null) {
                return Err(StepError::type_error("Target cannot be null or undefined."));
            }
            let name = expected.to_js_string();
            Verdict::new(
                actual.has_property(&name),
                format!("expected {a} to {{not}}have property '{name}'"),
            )
        }
        Operator::HaveType => {
            let tag = expected.to_js_string().to_lowercase();
            let article = if tag.starts_with(['a', 'e', 'i', 'o', 'u']) { "an" } else { "a" };
            Verdict::new(
                actual.type_tag() == tag,
                format!("expected {a} to {{not}}be {article} {tag}"),
            )
        }
        Operator::Match => {
            let pattern = match expected {
                Value::Regex(pattern) => pattern.clone(),
                other => Pattern::new(&other.to_js_string()).map_err(|err| {
                    StepError::type_error(format!("Invalid regular expression {e}: {err}"))
                })?,
            };
            Verdict::new(
                pattern.is_match(&actual.to_js_string()),
                format!("expected {a} to {{not}}match /{}/", pattern.source()),
            )
        }
        Operator::Contain => Verdict::new(contains(actual, expected)?, format!("expected {a} to {{not}}include {e}")),
        Operator::Above | Operator::Below => {
            let (x, y) = (number_operand(actual)?, number_operand(expected)?);
            let (passed, word) = if operator == Operator::Above {
                (x > y, "above")
            } else {
                (x < y, "below")
            };
            Verdict::new(
                passed,
                format!("expected {} to {{not}}be {word} {}", format_number(x), format_number(y)),
            )
        }
        Operator::Satisfy => {
            let Value::Function(predicate) = expected else {
                return Err(StepError::type_error(format!("expected {e} to be a function")));
            };
            let result = predicate.call(std::slice::from_ref(actual))?;
            Verdict::new(
                result.is_truthy(),
                format!("expected {a} to {{not}}satisfy {}", predicate.name()),
            )
        }
        Operator::CaseInsensitiveEqual => Verdict::new(
            actual.to_js_string().to_lowercase() == expected.to_js_string().to_lowercase(),
            format!("expected {a} to {{not}}equal {e} ignoring case"),
        ),
    };
    Ok(verdict)
}

fn array_operand(value: &Value) -> StepResult<&[Value]> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(StepError::type_error(format!("expected {} to be an array", other.inspect()))),
    }
}

fn number_operand(value: &Value) -> StepResult<f64> {
    let number = value.parse_float();
    if number.is_nan() {
        return Err(StepError::type_error(format!("{} is not a number", value.to_js_string())));
    }
    Ok(number)
}

/// Every item of `subset` has a strictly equal counterpart in `superset`
fn is_superset(superset: &[Value], subset: &[Value]) -> bool {
    let mut remaining: Vec<&Value> = superset.iter().collect();
    subset.iter().all(|wanted| {
        remaining
            .iter()
            .position(|candidate| candidate.strict_eq(wanted))
            .map(|i| remaining.swap_remove(i))
            .is_some()
    })
}

fn contains(actual: &Value, expected: &Value) -> StepResult<bool> {
    match actual {
        Value::String(text) => Ok(text.contains(&expected.to_js_string())),
        Value::Array(items) => Ok(items.iter().any(|item| item.strict_eq(expected))),
        Value::Object(map) => match expected {
            Value::Object(wanted) => Ok(wanted
                .iter()
                .all(|(k, v)| map.get(k).is_some_and(|have| have.strict_eq(v)))),
            other => Err(StepError::type_error(format!(
                "the given combination of arguments (object and {}) is invalid for this assertion",
                other.type_tag()
            ))),
        },
        other => Err(StepError::type_error(format!(
            "object tested must be an array, an object, or a string, but {} given",
            other.type_tag()
        ))),
    }
}
