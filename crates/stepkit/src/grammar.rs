//! Phrase grammars for validations and element conditions.

mod condition;
mod validation;

pub use condition::{phrase_pattern as condition_pattern, ConditionKind, NormalizedCondition};
pub use validation::{phrase_pattern as validation_pattern, NormalizedValidation, Operator};
