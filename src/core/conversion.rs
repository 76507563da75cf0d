//! # Value Conversion
//!
//! Raw arguments arrive as text (from the command line), lists of text
//! (variadic options) or already-typed values (piped or programmatic). Each one
//! is coerced to the [`ValueType`] its option declares.
use crate::core::{
    error::{ShellError, ShellResult},
    metadata::{OptionMetadata, ValueType},
};
use anyhow::{Result, anyhow};
use std::fmt;
use std::path::{Path, PathBuf};

/// A raw, unconverted argument.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArg {
    /// A single textual token.
    Text(String),
    /// The tokens claimed by a variadic option.
    List(Vec<String>),
    /// A value that is already typed.
    Typed(Value),
}

/// A converted argument value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value was supplied and the option has no default.
    #[default]
    Absent,
    /// Text.
    Text(String),
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A filesystem path, not yet resolved against the cursor.
    Path(PathBuf),
    /// The elements of a sequence option.
    List(Vec<Value>),
}

impl Value {
    /// Whether no value was supplied.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}

/// Converts the raw argument bound to `option`.
///
/// An absent argument falls back to the option's default, then to `false` for
/// booleans and to an empty list for sequences.
pub fn convert(option: &OptionMetadata, raw: Option<&RawArg>) -> ShellResult<Value> {
    match raw {
        Some(raw) => convert_raw(option, option.value_type(), raw),
        None => match option.default_value() {
            Some(default) => convert_text(option, option.value_type(), default),
            None if option.is_boolean() => Ok(Value::Bool(false)),
            None if option.is_varargs() => Ok(Value::List(Vec::new())),
            None => Ok(Value::Absent),
        },
    }
}

fn convert_raw(option: &OptionMetadata, target: &ValueType, raw: &RawArg) -> ShellResult<Value> {
    match (raw, target) {
        (RawArg::Text(text), _) => convert_text(option, target, text),
        (RawArg::List(items), ValueType::Sequence(inner)) => items
            .iter()
            .map(|item| convert_text(option, inner, item))
            .collect::<ShellResult<Vec<_>>>()
            .map(Value::List),
        (RawArg::List(items), _) => convert_text(option, target, &items.join(" ")),
        (RawArg::Typed(value), _) => convert_typed(option, target, value),
    }
}

fn convert_typed(option: &OptionMetadata, target: &ValueType, value: &Value) -> ShellResult<Value> {
    match (value, target) {
        (Value::Absent, _) => convert(option, None),
        (Value::Text(s), _) => convert_text(option, target, s),
        (Value::Bool(_), ValueType::Boolean)
        | (Value::Int(_), ValueType::Integer)
        | (Value::Float(_), ValueType::Float)
        | (Value::Path(_), ValueType::Path) => Ok(value.clone()),
        (Value::Int(i), ValueType::Float) => Ok(Value::Float(*i as f64)),
        (Value::List(items), ValueType::Sequence(inner)) => items
            .iter()
            .map(|item| convert_typed(option, inner, item))
            .collect::<ShellResult<Vec<_>>>()
            .map(Value::List),
        (Value::List(_), _) => convert_text(option, target, &value.to_string()),
        (other, ValueType::String) => Ok(Value::Text(other.to_string())),
        (other, ValueType::Sequence(inner)) => {
            convert_typed(option, inner, other).map(|v| Value::List(vec![v]))
        }
        (other, _) => Err(mismatch(option, target, &other.to_string())),
    }
}

fn convert_text(option: &OptionMetadata, target: &ValueType, text: &str) -> ShellResult<Value> {
    match target {
        ValueType::String => Ok(Value::Text(text.to_string())),
        ValueType::Boolean => parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| mismatch(option, target, text)),
        ValueType::Integer => text
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| mismatch(option, target, text)),
        ValueType::Float => text
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| mismatch(option, target, text)),
        ValueType::Path => Ok(Value::Path(PathBuf::from(text))),
        ValueType::Sequence(inner) => text
            .split_whitespace()
            .map(|item| convert_text(option, inner, item))
            .collect::<ShellResult<Vec<_>>>()
            .map(Value::List),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn mismatch(option: &OptionMetadata, target: &ValueType, value: &str) -> ShellError {
    ShellError::TypeConversion {
        option: option.option_descriptor(),
        expected: target.to_string(),
        value: value.to_string(),
    }
}

/// The converted arguments of one invocation, by declared option index.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    /// Wraps converted values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// The value at `index`, `Absent` when out of range.
    pub fn value(&self, index: usize) -> &Value {
        const ABSENT: &Value = &Value::Absent;
        self.values.get(index).unwrap_or(ABSENT)
    }

    /// Text at `index`, if any value was supplied. Non-text values are rendered.
    pub fn opt_string(&self, index: usize) -> Option<String> {
        match self.value(index) {
            Value::Absent => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Text at `index`; an error when absent.
    pub fn string(&self, index: usize) -> Result<String> {
        self.opt_string(index)
            .ok_or_else(|| anyhow!("argument {} was not provided", index))
    }

    /// Boolean at `index`; `false` when absent.
    pub fn boolean(&self, index: usize) -> bool {
        matches!(self.value(index), Value::Bool(true))
    }

    /// Integer at `index`.
    pub fn integer(&self, index: usize) -> Result<i64> {
        match self.value(index) {
            Value::Int(i) => Ok(*i),
            other => Err(anyhow!("argument {} is not an integer: '{}'", index, other)),
        }
    }

    /// Path at `index`, if supplied.
    pub fn path(&self, index: usize) -> Option<&Path> {
        match self.value(index) {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Sequence at `index` rendered as strings; empty when absent.
    pub fn strings(&self, index: usize) -> Vec<String> {
        match self.value(index) {
            Value::List(items) => items.iter().map(ToString::to_string).collect(),
            Value::Absent => Vec::new(),
            other => vec![other.to_string()],
        }
    }

    /// Number of declared options.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the command declares no options.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawArg {
        RawArg::Text(s.to_string())
    }

    #[test]
    fn test_integer_conversion_and_failure() {
        let option = OptionMetadata::positional(ValueType::Integer).with_description("count");
        assert_eq!(convert(&option, Some(&text("42"))).unwrap(), Value::Int(42));

        let err = convert(&option, Some(&text("forty"))).unwrap_err();
        assert!(matches!(
            &err,
            ShellError::TypeConversion { option, expected, .. }
                if option == "[count (int)]" && expected == "int"
        ));
    }

    #[test]
    fn test_absent_boolean_defaults_to_false() {
        let flag = OptionMetadata::flag("verbose");
        assert_eq!(convert(&flag, None).unwrap(), Value::Bool(false));

        let with_default = OptionMetadata::flag("color").with_default("true");
        assert_eq!(convert(&with_default, None).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_boolean_spellings() {
        let option = OptionMetadata::named("force", ValueType::Boolean);
        for (raw, expected) in [("yes", true), ("OFF", false), ("1", true), ("false", false)] {
            assert_eq!(convert(&option, Some(&text(raw))).unwrap(), Value::Bool(expected));
        }
        assert!(convert(&option, Some(&text("maybe"))).is_err());
    }

    #[test]
    fn test_absent_without_default() {
        let option = OptionMetadata::named("name", ValueType::String);
        assert_eq!(convert(&option, None).unwrap(), Value::Absent);

        let varargs = OptionMetadata::positional(ValueType::Sequence(Box::new(ValueType::String)));
        assert_eq!(convert(&varargs, None).unwrap(), Value::List(Vec::new()));
    }

    #[test]
    fn test_list_conversion_checks_every_element() {
        let option = OptionMetadata::positional(ValueType::Sequence(Box::new(ValueType::Integer)));
        let ok = RawArg::List(vec!["1".to_string(), "2".to_string()]);
        assert_eq!(
            convert(&option, Some(&ok)).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );

        let bad = RawArg::List(vec!["1".to_string(), "x".to_string()]);
        assert!(convert(&option, Some(&bad)).is_err());
    }

    #[test]
    fn test_typed_values_pass_through_or_render() {
        let int = OptionMetadata::named("n", ValueType::Integer);
        assert_eq!(
            convert(&int, Some(&RawArg::Typed(Value::Int(7)))).unwrap(),
            Value::Int(7)
        );

        let string = OptionMetadata::named("s", ValueType::String);
        assert_eq!(
            convert(&string, Some(&RawArg::Typed(Value::Bool(true)))).unwrap(),
            Value::Text("true".to_string())
        );

        assert!(convert(&int, Some(&RawArg::Typed(Value::Bool(true)))).is_err());
    }

    #[test]
    fn test_arguments_accessors() {
        let args = Arguments::new(vec![
            Value::Text("a".to_string()),
            Value::Bool(true),
            Value::List(vec![Value::Text("x".to_string()), Value::Text("y".to_string())]),
        ]);
        assert_eq!(args.string(0).unwrap(), "a");
        assert!(args.boolean(1));
        assert_eq!(args.strings(2), vec!["x".to_string(), "y".to_string()]);
        assert!(args.value(9).is_absent());
        assert!(args.string(9).is_err());
    }
}
