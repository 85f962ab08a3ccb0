//! Dynamic values flowing through steps.
//!
//! Step arguments, memory entries and element properties are all [`Value`]s.
//! The comparison helpers here follow the loose, strict and deep equality
//! rules that feature authors expect from browser-side test tooling.

use crate::result::StepResult;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Signature of functions stored in memory
pub type NativeFn = dyn Fn(&[Value]) -> StepResult<Value> + Send + Sync;

/// A named function value
#[derive(Clone)]
pub struct Callable {
    name: String,
    func: Arc<NativeFn>,
}

impl Callable {
    /// Wrap a closure as a callable value
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> StepResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Function name, used in messages
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> StepResult<Value> {
        (self.func)(args)
    }

    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("name", &self.name).finish()
    }
}

/// A compiled regular expression value
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Pattern source
    #[must_use]
    pub fn source(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the pattern matches anywhere in `text`
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

/// A dynamically typed step value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// String
    String(String),
    /// Ordered list
    Array(Vec<Value>),
    /// String-keyed map
    Object(BTreeMap<String, Value>),
    /// Regular expression
    Regex(Pattern),
    /// Function
    Function(Callable),
}

impl Value {
    /// Type tag as reported by `have type` validations
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Regex(_) => "regexp",
            Self::Function(_) => "function",
        }
    }

    /// String conversion used for interpolation and numeric parsing
    #[must_use]
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Undefined | Self::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => "[object Object]".to_string(),
            Self::Regex(p) => format!("/{}/", p.source()),
            Self::Function(f) => format!("function {}", f.name()),
        }
    }

    /// Human-readable rendering for assertion messages
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Self::String(s) => format!("'{s}'"),
            Self::Array(items) if items.is_empty() => "[]".to_string(),
            Self::Array(items) => format!(
                "[ {} ]",
                items.iter().map(Self::inspect).collect::<Vec<_>>().join(", ")
            ),
            Self::Object(map) if map.is_empty() => "{}".to_string(),
            Self::Object(map) => format!(
                "{{ {} }}",
                map.iter()
                    .map(|(k, v)| format!("{k}: {}", v.inspect()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Function(f) => format!("[Function {}]", f.name()),
            other => other.to_js_string(),
        }
    }

    /// Numeric conversion used by loose equality
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Regex(_) | Self::Function(_) => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
            Self::Array(_) | Self::Object(_) => string_to_number(&self.to_js_string()),
        }
    }

    /// Leading-number parse of the value's string form (`"12px"` is 12)
    #[must_use]
    pub fn parse_float(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            other => parse_float(&other.to_js_string()),
        }
    }

    /// Truthiness
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Property access: object keys, array/string indices and `length`
    #[must_use]
    pub fn property(&self, name: &str) -> Self {
        match self {
            Self::Object(map) => map.get(name).cloned().unwrap_or_default(),
            Self::Array(items) => {
                if name == "length" {
                    Self::Number(items.len() as f64)
                } else {
                    name.parse::<usize>()
                        .ok()
                        .and_then(|i| items.get(i).cloned())
                        .unwrap_or_default()
                }
            }
            Self::String(s) => {
                if name == "length" {
                    Self::Number(s.chars().count() as f64)
                } else {
                    name.parse::<usize>()
                        .ok()
                        .and_then(|i| s.chars().nth(i))
                        .map(|c| Self::String(c.to_string()))
                        .unwrap_or_default()
                }
            }
            Self::Regex(p) if name == "source" => Self::String(p.source().to_string()),
            Self::Function(f) if name == "name" => Self::String(f.name().to_string()),
            _ => Self::Undefined,
        }
    }

    /// Whether `name` is an own property of the value
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        match self {
            Self::Object(map) => map.contains_key(name),
            Self::Array(items) => {
                name == "length" || name.parse::<usize>().is_ok_and(|i| i < items.len())
            }
            Self::String(s) => {
                name == "length" || name.parse::<usize>().is_ok_and(|i| i < s.chars().count())
            }
            _ => false,
        }
    }

    /// Loose equality: `null == undefined`, numbers and strings coerce
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        use Value::{Array, Bool, Null, Number, Object, String, Undefined};
        match (self, other) {
            (Undefined | Null, Undefined | Null) => true,
            (Undefined | Null, _) | (_, Undefined | Null) => false,
            (Number(a), String(_)) => *a == other.to_number(),
            (String(_), Number(b)) => self.to_number() == *b,
            (Bool(_), _) => Number(self.to_number()).loose_eq(other),
            (_, Bool(_)) => self.loose_eq(&Number(other.to_number())),
            (Array(_) | Object(_), Number(_) | String(_)) => {
                String(self.to_js_string()).loose_eq(other)
            }
            (Number(_) | String(_), Array(_) | Object(_)) => {
                self.loose_eq(&String(other.to_js_string()))
            }
            _ => self.strict_eq(other),
        }
    }

    /// Strict equality: same kind, no coercion, structural for collections
    #[must_use]
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.strict_eq(other)))
            }
            (Self::Regex(a), Self::Regex(b)) => a.source() == b.source(),
            (Self::Function(a), Self::Function(b)) => a.same(b),
            _ => false,
        }
    }

    /// Deep structural equality, `NaN` equals `NaN`
    #[must_use]
    pub fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.deep_eq(other)))
            }
            _ => self.strict_eq(other),
        }
    }

    /// Convert to JSON; functions and patterns become strings
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Regex(_) | Self::Function(_) => serde_json::Value::String(self.inspect()),
        }
    }

    /// Build an object value from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Array(items)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Self::Function(f)
    }
}

impl From<Pattern> for Value {
    fn from(p: Pattern) -> Self {
        Self::Regex(p)
    }
}

/// Render a number the way browser tooling prints it (`1` not `1.0`)
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{:.0}", n + 0.0)
    } else {
        format!("{n}")
    }
}

fn float_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|\d+\.?\d*(?:[eE][+-]?\d+)?|\.\d+(?:[eE][+-]?\d+)?)")
            .unwrap_or_else(|e| unreachable!("static float pattern: {e}"))
    })
}

/// Parse the longest numeric prefix of `text`, `NaN` when there is none
#[must_use]
pub fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let Some(m) = float_prefix().find(trimmed) else {
        return f64::NAN;
    };
    let digits = m.as_str();
    match digits.trim_start_matches(['+', '-']) {
        "Infinity" if digits.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => digits.parse().unwrap_or(f64::NAN),
    }
}

fn string_to_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    if s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_format_number() {
            assert_eq!(format_number(1.0), "1");
            assert_eq!(format_number(-0.0), "0");
            assert_eq!(format_number(2.5), "2.5");
            assert_eq!(format_number(f64::NAN), "NaN");
            assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        }

        #[test]
        fn test_parse_float_prefix() {
            assert_eq!(parse_float("12px"), 12.0);
            assert_eq!(parse_float("  -3.5e2 apples"), -350.0);
            assert_eq!(parse_float(".5"), 0.5);
            assert!(parse_float("x").is_nan());
            assert!(parse_float("").is_nan());
        }

        #[test]
        fn test_to_js_string() {
            let arr = Value::Array(vec![1.into(), Value::Null, "a".into()]);
            assert_eq!(arr.to_js_string(), "1,,a");
            assert_eq!(Value::object([("a", Value::from(1))]).to_js_string(), "[object Object]");
        }

        #[test]
        fn test_inspect() {
            let obj = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);
            assert_eq!(obj.inspect(), "{ a: 1, b: 'x' }");
            assert_eq!(Value::Array(vec![]).inspect(), "[]");
        }

        #[test]
        fn test_from_json() {
            let v: Value = serde_json::from_str(r#"{"a":[1,"x",null,true]}"#).unwrap();
            assert_eq!(v.property("a").property("length"), Value::from(4));
            assert_eq!(v.property("a").property("1"), Value::from("x"));
            assert_eq!(v.to_json()["a"][0], serde_json::json!(1.0));
        }
    }

    mod equality_tests {
        use super::*;

        #[test]
        fn test_loose_eq_coerces() {
            assert!(Value::from(1).loose_eq(&Value::from("1")));
            assert!(Value::from("1").loose_eq(&Value::from(1)));
            assert!(Value::Null.loose_eq(&Value::Undefined));
            assert!(Value::from(true).loose_eq(&Value::from(1)));
            assert!(Value::from("").loose_eq(&Value::from(0)));
            assert!(Value::Array(vec![1.into(), 2.into()]).loose_eq(&Value::from("1,2")));
            assert!(!Value::Null.loose_eq(&Value::from(0)));
            assert!(!Value::from(f64::NAN).loose_eq(&Value::from(f64::NAN)));
        }

        #[test]
        fn test_strict_eq_does_not_coerce() {
            assert!(!Value::from(1).strict_eq(&Value::from("1")));
            assert!(Value::from("a").strict_eq(&Value::from("a")));
            assert!(!Value::Null.strict_eq(&Value::Undefined));
        }

        #[test]
        fn test_deep_eq() {
            let a = Value::object([("k", Value::Array(vec![1.into(), 2.into()]))]);
            let b = Value::object([("k", Value::Array(vec![1.into(), 2.into()]))]);
            let c = Value::object([("k", Value::Array(vec![2.into(), 1.into()]))]);
            assert!(a.deep_eq(&b));
            assert!(!a.deep_eq(&c));
            assert!(Value::from(f64::NAN).deep_eq(&Value::from(f64::NAN)));
        }

        #[test]
        fn test_functions_compare_by_identity() {
            let f = Callable::new("f", |_| Ok(Value::Null));
            let g = Callable::new("f", |_| Ok(Value::Null));
            assert!(Value::from(f.clone()).strict_eq(&Value::from(f.clone())));
            assert!(!Value::from(f).strict_eq(&Value::from(g)));
        }
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_property_lookup() {
            assert_eq!(Value::from("abc").property("length"), Value::from(3));
            assert_eq!(Value::from("abc").property("1"), Value::from("b"));
            assert_eq!(Value::from(5).property("x"), Value::Undefined);
        }

        #[test]
        fn test_has_property() {
            let obj = Value::object([("a", Value::Undefined)]);
            assert!(obj.has_property("a"));
            assert!(!obj.has_property("b"));
            assert!(Value::Array(vec![1.into()]).has_property("0"));
            assert!(!Value::Array(vec![1.into()]).has_property("1"));
        }

        #[test]
        fn test_type_tags() {
            assert_eq!(Value::Null.type_tag(), "null");
            assert_eq!(Value::Array(vec![]).type_tag(), "array");
            assert_eq!(Value::from(Pattern::new("a").unwrap()).type_tag(), "regexp");
        }
    }
}
