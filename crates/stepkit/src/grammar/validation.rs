//! Validation phrases: `does not equal`, `to be softly above`, `to have members`.

use crate::result::{StepError, StepResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// Normalized comparison kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Loose equality with coercion
    Equal,
    /// Strict equality, no coercion
    StrictlyEqual,
    /// Deep structural equality
    DeeplyEqual,
    /// Same members in any order
    HaveMembers,
    /// Superset of members
    IncludeMembers,
    /// Has own property
    HaveProperty,
    /// Type tag equals
    HaveType,
    /// Regular expression match
    Match,
    /// Substring, element or subset containment
    Contain,
    /// Numerically greater
    Above,
    /// Numerically smaller
    Below,
    /// Predicate function returns truthy
    Satisfy,
    /// String equality ignoring case
    CaseInsensitiveEqual,
}

/// Phrase keywords, most specific first; several may map to one operator
const KEYWORDS: &[(&str, Operator)] = &[
    ("case insensitive equal", Operator::CaseInsensitiveEqual),
    ("strictly equal", Operator::StrictlyEqual),
    ("deeply equal", Operator::DeeplyEqual),
    ("equal", Operator::Equal),
    ("ha(?:ve|s) member", Operator::HaveMembers),
    ("include member", Operator::IncludeMembers),
    ("ha(?:ve|s) property", Operator::HaveProperty),
    ("ha(?:ve|s) type", Operator::HaveType),
    ("match", Operator::Match),
    ("contain", Operator::Contain),
    ("above", Operator::Above),
    ("below", Operator::Below),
    ("greater than", Operator::Above),
    ("less than", Operator::Below),
    ("satisf(?:y|ie)", Operator::Satisfy),
];

impl Operator {
    /// All operators
    pub const ALL: [Self; 13] = [
        Self::Equal,
        Self::StrictlyEqual,
        Self::DeeplyEqual,
        Self::HaveMembers,
        Self::IncludeMembers,
        Self::HaveProperty,
        Self::HaveType,
        Self::Match,
        Self::Contain,
        Self::Above,
        Self::Below,
        Self::Satisfy,
        Self::CaseInsensitiveEqual,
    ];

    /// Canonical phrase keyword
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::StrictlyEqual => "strictly equal",
            Self::DeeplyEqual => "deeply equal",
            Self::HaveMembers => "have members",
            Self::IncludeMembers => "include members",
            Self::HaveProperty => "have property",
            Self::HaveType => "have type",
            Self::Match => "match",
            Self::Contain => "contain",
            Self::Above => "above",
            Self::Below => "below",
            Self::Satisfy => "satisfy",
            Self::CaseInsensitiveEqual => "case insensitive equal",
        }
    }

    const fn reads_with_be(self) -> bool {
        matches!(self, Self::Above | Self::Below)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

fn prefix() -> &'static str {
    "(?:is |do |does |to )?(?P<reverse>not |to not )?(?:to )?(?:be )?(?P<soft>softly )?"
}

fn keyword_alternation(named: bool) -> String {
    let alternatives = KEYWORDS
        .iter()
        .enumerate()
        .map(|(i, (keyword, _))| {
            if named {
                format!("(?P<k{i}>{keyword})")
            } else {
                format!("(?:{keyword})")
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    format!("(?:{alternatives})")
}

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        let source = format!("^{}{}(?:s|es)?(?: to)?$", prefix(), keyword_alternation(true));
        Regex::new(&source).unwrap_or_else(|e| unreachable!("validation grammar: {e}"))
    })
}

/// Unanchored pattern matching any validation phrase, for step registration
#[must_use]
pub fn phrase_pattern() -> String {
    let prefix = prefix().replace("?P<reverse>", "?:").replace("?P<soft>", "?:");
    format!("{prefix}{}(?:s|es)?(?: to)?", keyword_alternation(false))
}

/// A validation phrase reduced to operator, negation and soft flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedValidation {
    /// Comparison kind
    pub operator: Operator,
    /// Whether the predicate is negated
    pub negated: bool,
    /// Whether a failure is recorded instead of raised
    pub soft: bool,
}

impl NormalizedValidation {
    /// Create a normalized validation
    #[must_use]
    pub const fn new(operator: Operator, negated: bool, soft: bool) -> Self {
        Self {
            operator,
            negated,
            soft,
        }
    }

    /// Parse a validation phrase
    pub fn parse(phrase: &str) -> StepResult<Self> {
        let unsupported = || StepError::grammar(phrase, format!("validation '{phrase}' is not supported"));
        let caps = grammar().captures(phrase).ok_or_else(unsupported)?;
        let operator = KEYWORDS
            .iter()
            .enumerate()
            .find(|(i, _)| caps.name(&format!("k{i}")).is_some())
            .map(|(_, (_, operator))| *operator)
            .ok_or_else(unsupported)?;
        let normalized = Self::new(
            operator,
            caps.name("reverse").is_some(),
            caps.name("soft").is_some(),
        );
        debug!(phrase, ?normalized, "parsed validation");
        Ok(normalized)
    }

    /// Render a phrase that parses back to this validation
    #[must_use]
    pub fn to_phrase(&self) -> String {
        let mut words = vec!["to"];
        if self.negated {
            words.push("not");
        }
        if self.operator.reads_with_be() {
            words.push("be");
        }
        if self.soft {
            words.push("softly");
        }
        words.push(self.operator.keyword());
        words.join(" ")
    }
}

impl fmt::Display for NormalizedValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_phrase())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(phrase: &str) -> NormalizedValidation {
        NormalizedValidation::parse(phrase).unwrap()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_negated_equal() {
            assert_eq!(parse("does not equal"), NormalizedValidation::new(Operator::Equal, true, false));
        }

        #[test]
        fn test_strictly_equal() {
            assert_eq!(
                parse("to strictly equal"),
                NormalizedValidation::new(Operator::StrictlyEqual, false, false)
            );
        }

        #[test]
        fn test_auxiliary_verbs_and_suffixes() {
            assert_eq!(parse("equals").operator, Operator::Equal);
            assert_eq!(parse("is equal to").operator, Operator::Equal);
            assert_eq!(parse("to be equal").operator, Operator::Equal);
            assert_eq!(parse("contains").operator, Operator::Contain);
            assert_eq!(parse("matches").operator, Operator::Match);
            assert_eq!(parse("to have members").operator, Operator::HaveMembers);
            assert_eq!(parse("has type").operator, Operator::HaveType);
            assert_eq!(parse("satisfies").operator, Operator::Satisfy);
            assert_eq!(parse("to be case insensitive equal").operator, Operator::CaseInsensitiveEqual);
        }

        #[test]
        fn test_aliases_map_to_above_and_below() {
            assert_eq!(parse("is greater than").operator, Operator::Above);
            assert_eq!(parse("to be less than").operator, Operator::Below);
            assert_eq!(parse("to be above").operator, Operator::Above);
        }

        #[test]
        fn test_negation_forms() {
            assert!(parse("not to equal").negated);
            assert!(parse("to not equal").negated);
            assert!(parse("is not above").negated);
            assert!(!parse("to equal").negated);
        }

        #[test]
        fn test_soft_is_orthogonal() {
            assert_eq!(
                parse("to not softly deeply equal"),
                NormalizedValidation::new(Operator::DeeplyEqual, true, true)
            );
            assert_eq!(parse("to be softly above"), NormalizedValidation::new(Operator::Above, false, true));
        }

        #[test]
        fn test_unsupported_phrase() {
            let err = NormalizedValidation::parse("to resemble").unwrap_err();
            assert_eq!(err.to_string(), "validation 'to resemble' is not supported");
            assert!(NormalizedValidation::parse("").is_err());
            assert!(NormalizedValidation::parse("equal please").is_err());
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_round_trip_every_operator() {
            for operator in Operator::ALL {
                for negated in [false, true] {
                    for soft in [false, true] {
                        let normalized = NormalizedValidation::new(operator, negated, soft);
                        assert_eq!(parse(&normalized.to_phrase()), normalized);
                    }
                }
            }
        }

        #[test]
        fn test_rendering() {
            let normalized = NormalizedValidation::new(Operator::Above, true, true);
            assert_eq!(normalized.to_string(), "to not be softly above");
        }

        #[test]
        fn test_phrase_pattern_is_unanchored() {
            let pattern = Regex::new(&phrase_pattern()).unwrap();
            assert!(pattern.is_match("I expect '1' to equal '1'"));
            assert_eq!(pattern.captures_len(), 1);
        }

        #[test]
        fn test_serialized_operator_names() {
            let json = serde_json::to_string(&Operator::CaseInsensitiveEqual).unwrap();
            assert_eq!(json, "\"caseInsensitiveEqual\"");
        }
    }
}
