//! Per-scenario memory store.
//!
//! Steps pass values to each other through [`Memory`]. A token that is a
//! complete memory reference (`$user`, `$user.name`, `$rows[2]`,
//! `$format.date('iso')`, `$now()`) resolves to the stored value itself;
//! any other text is a literal in which `{$expr}` placeholders are
//! interpolated and `\$` stands for a literal dollar sign.

use crate::result::{StepError, StepResult};
use crate::value::{Callable, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

const ESCAPED_SIGIL: &str = "\\$";
const SIGIL_PLACEHOLDER: char = '\u{0}';

/// Key/value registry with expression-based lookup
#[derive(Debug, Clone, Default)]
pub struct Memory {
    values: BTreeMap<String, Value>,
}

impl Memory {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from a YAML (or JSON) mapping of keys to values
    pub fn from_yaml_str(yaml: &str) -> StepResult<Self> {
        let values: BTreeMap<String, Value> = serde_yaml_ng::from_str(yaml)?;
        Ok(Self { values })
    }

    /// Seed a store from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> StepResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Store a value; a leading `$` on the key is ignored
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) {
        let key = key.strip_prefix('$').unwrap_or(key).to_string();
        debug!(key = %key, "memory set");
        self.values.insert(key, value.into());
    }

    /// Store a function under `name`
    pub fn register_fn<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[Value]) -> StepResult<Value> + Send + Sync + 'static,
    {
        self.set_value(name, Callable::new(name, func));
    }

    /// Whether a key is stored
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key.strip_prefix('$').unwrap_or(key))
    }

    /// Stored keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve an expression to a value.
    ///
    /// A complete reference returns the stored value (unknown keys are an
    /// error). Anything else is returned as a string after interpolation.
    pub fn get_value(&self, expression: &str) -> StepResult<Value> {
        if let Some(reference) = Reference::parse(expression) {
            debug!(expression, "resolving memory reference");
            return self.evaluate(&reference);
        }
        self.interpolate(expression).map(Value::String)
    }

    /// Replace `{$expr}` placeholders with their string form
    pub fn interpolate(&self, text: &str) -> StepResult<String> {
        let protected = text.replace(ESCAPED_SIGIL, &SIGIL_PLACEHOLDER.to_string());
        let mut output = String::with_capacity(protected.len());
        let mut last = 0;
        for caps in placeholder_pattern().captures_iter(&protected) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let expression = format!("${}", inner.as_str());
            let reference = Reference::parse(&expression).ok_or_else(|| {
                StepError::resolution(format!("'{expression}' is not a valid memory expression"))
            })?;
            output.push_str(&protected[last..whole.start()]);
            output.push_str(&self.evaluate(&reference)?.to_js_string());
            last = whole.end();
        }
        output.push_str(&protected[last..]);
        Ok(output.replace(SIGIL_PLACEHOLDER, "$"))
    }

    fn lookup(&self, key: &str) -> StepResult<Value> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| StepError::resolution(format!("${key} is not found in memory")))
    }

    fn evaluate(&self, reference: &Reference) -> StepResult<Value> {
        let mut current = self.lookup(&reference.root)?;
        let mut described = format!("${}", reference.root);
        for segment in &reference.segments {
            match segment {
                Segment::Property(name) => {
                    current = current.property(name);
                    described = format!("{described}.{name}");
                }
                Segment::Index(arg) => {
                    let key = self.argument(arg)?;
                    current = current.property(&key.to_js_string());
                    described = format!("{described}[{}]", key.to_js_string());
                }
                Segment::Call(args) => {
                    let Value::Function(func) = &current else {
                        return Err(StepError::type_error(format!(
                            "{described} is not a function"
                        )));
                    };
                    let resolved = args
                        .iter()
                        .map(|arg| self.argument(arg))
                        .collect::<StepResult<Vec<_>>>()?;
                    current = func.call(&resolved)?;
                    described = format!("{described}()");
                }
            }
        }
        Ok(current)
    }

    fn argument(&self, arg: &Argument) -> StepResult<Value> {
        match arg {
            Argument::Literal(value) => Ok(value.clone()),
            Argument::Reference(reference) => self.evaluate(reference),
        }
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\$([^{}]+)\}").unwrap_or_else(|e| unreachable!("static placeholder pattern: {e}"))
    })
}

#[derive(Debug, Clone)]
struct Reference {
    root: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Property(String),
    Index(Argument),
    Call(Vec<Argument>),
}

#[derive(Debug, Clone)]
enum Argument {
    Literal(Value),
    Reference(Reference),
}

impl Reference {
    /// Parse a complete reference; `None` when `text` is not one
    fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('$')?;
        let (root, mut rest) = split_identifier(rest)?;
        let mut segments = Vec::new();
        while let Some(c) = rest.chars().next() {
            match c {
                '.' => {
                    let (name, tail) = split_identifier(&rest[1..])?;
                    segments.push(Segment::Property(name.to_string()));
                    rest = tail;
                }
                '[' => {
                    let (inner, tail) = split_enclosed(rest, '[', ']')?;
                    segments.push(Segment::Index(Argument::parse(inner)?));
                    rest = tail;
                }
                '(' => {
                    let (inner, tail) = split_enclosed(rest, '(', ')')?;
                    let args = split_arguments(inner)
                        .into_iter()
                        .map(Argument::parse)
                        .collect::<Option<Vec<_>>>()?;
                    segments.push(Segment::Call(args));
                    rest = tail;
                }
                _ => return None,
            }
        }
        Some(Self {
            root: root.to_string(),
            segments,
        })
    }
}

impl Argument {
    fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let quoted = text.len() >= 2
            && ((text.starts_with('\'') && text.ends_with('\''))
                || (text.starts_with('"') && text.ends_with('"')));
        if quoted {
            return Some(Self::Literal(Value::String(text[1..text.len() - 1].to_string())));
        }
        if text.starts_with('$') {
            return Reference::parse(text).map(Self::Reference);
        }
        let literal = match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            "undefined" => Value::Undefined,
            _ => numeric_literal(text).map_or_else(|| Value::String(text.to_string()), Value::Number),
        };
        Some(Self::Literal(literal))
    }
}

fn numeric_literal(text: &str) -> Option<f64> {
    let starts_numeric = text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if starts_numeric && text.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        text.parse().ok()
    } else {
        None
    }
}

fn split_identifier(text: &str) -> Option<(&str, &str)> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    let end = chars
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(text.len(), |(i, _)| i);
    Some((&text[..end], &text[end..]))
}

/// Split `open ... close` off the front of `text`, honouring quotes and nesting
fn split_enclosed(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some((&text[open.len_utf8()..i], &text[i + close.len_utf8()..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split call arguments on top-level commas
fn split_arguments(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> Memory {
        let mut memory = Memory::from_yaml_str(
            r"
user:
  name: Alice
  roles: [admin, editor]
price: 42
",
        )
        .unwrap();
        memory.register_fn("upper", |args| {
            Ok(Value::String(
                args.first().map(Value::to_js_string).unwrap_or_default().to_uppercase(),
            ))
        });
        memory.register_fn("sum", |args| Ok(Value::Number(args.iter().map(Value::to_number).sum())));
        memory
    }

    mod reference_tests {
        use super::*;

        #[test]
        fn test_plain_reference() {
            let memory = sample();
            assert_eq!(memory.get_value("$price").unwrap(), Value::from(42));
        }

        #[test]
        fn test_property_and_index() {
            let memory = sample();
            assert_eq!(memory.get_value("$user.name").unwrap(), Value::from("Alice"));
            assert_eq!(memory.get_value("$user.roles[1]").unwrap(), Value::from("editor"));
            assert_eq!(memory.get_value("$user.roles.length").unwrap(), Value::from(2));
            assert_eq!(memory.get_value("$user['name']").unwrap(), Value::from("Alice"));
        }

        #[test]
        fn test_function_call() {
            let memory = sample();
            assert_eq!(memory.get_value("$upper('abc')").unwrap(), Value::from("ABC"));
            assert_eq!(memory.get_value("$sum(1, 2, $price)").unwrap(), Value::from(45));
            assert_eq!(memory.get_value("$upper($user.name)").unwrap(), Value::from("ALICE"));
        }

        #[test]
        fn test_method_on_object() {
            let mut memory = Memory::new();
            memory.set_value(
                "fmt",
                Value::object([(
                    "twice",
                    Value::from(Callable::new("twice", |args| {
                        Ok(Value::Number(args[0].to_number() * 2.0))
                    })),
                )]),
            );
            assert_eq!(memory.get_value("$fmt.twice(21)").unwrap(), Value::from(42));
        }

        #[test]
        fn test_uncalled_function_is_returned() {
            let memory = sample();
            assert_eq!(memory.get_value("$upper").unwrap().type_tag(), "function");
        }

        #[test]
        fn test_missing_key_errors() {
            let err = sample().get_value("$missing").unwrap_err();
            assert_eq!(err.to_string(), "$missing is not found in memory");
        }

        #[test]
        fn test_calling_non_function_errors() {
            let err = sample().get_value("$price()").unwrap_err();
            assert!(matches!(err, StepError::Type { .. }));
        }
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn test_non_references_are_literal() {
            let memory = sample();
            assert_eq!(memory.get_value("hello").unwrap(), Value::from("hello"));
            assert_eq!(memory.get_value("$5.00").unwrap(), Value::from("$5.00"));
            assert_eq!(memory.get_value("$price and more").unwrap(), Value::from("$price and more"));
        }

        #[test]
        fn test_interpolation() {
            let memory = sample();
            assert_eq!(
                memory.get_value("Hello {$user.name}, you owe {$price}").unwrap(),
                Value::from("Hello Alice, you owe 42")
            );
        }

        #[test]
        fn test_escaped_sigil() {
            let memory = sample();
            assert_eq!(memory.get_value("\\$price").unwrap(), Value::from("$price"));
        }

        #[test]
        fn test_set_value_strips_sigil() {
            let mut memory = Memory::new();
            memory.set_value("$saved", "x");
            assert!(memory.contains("saved"));
            assert_eq!(memory.get_value("$saved").unwrap(), Value::from("x"));
        }
    }

    mod file_tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn test_from_path() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "answer: 42").unwrap();
            let memory = Memory::from_path(file.path()).unwrap();
            assert_eq!(memory.len(), 1);
            assert_eq!(memory.get_value("$answer").unwrap(), Value::from(42));
        }
    }
}
