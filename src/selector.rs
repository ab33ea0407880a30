//! Declarative projection into JSON documents.
//!
//! A chain of [`Selector`]s is applied left to right, each step narrowing
//! the value produced by the previous one.

use serde_json::Value;

use crate::error::SelectorError;

#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Name(String),
    Index(usize),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Keep the first object of a sequence whose `key` equals `value`.
    FieldEquals { key: String, value: Value },
    /// `data[key]` on a mapping or sequence.
    Project(Key),
}

impl Selector {
    pub fn field_equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Selector::FieldEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn project(key: impl Into<Key>) -> Self {
        Selector::Project(key.into())
    }

    fn apply(&self, data: Value) -> Result<Value, SelectorError> {
        match self {
            Selector::FieldEquals { key, value } => match data {
                Value::Array(items) => items
                    .into_iter()
                    .find(|item| item.get(key.as_str()) == Some(value))
                    .ok_or_else(|| SelectorError::NoMatch {
                        key: key.clone(),
                        value: value.clone(),
                    }),
                other => Err(mismatch("array", &other)),
            },
            Selector::Project(Key::Name(name)) => match data {
                Value::Object(mut map) => map
                    .remove(name)
                    .ok_or_else(|| SelectorError::KeyNotFound(name.clone())),
                other => Err(mismatch("object", &other)),
            },
            Selector::Project(Key::Index(index)) => match data {
                Value::Array(mut items) => {
                    let len = items.len();
                    if *index < len {
                        Ok(items.swap_remove(*index))
                    } else {
                        Err(SelectorError::IndexOutOfRange { index: *index, len })
                    }
                }
                other => Err(mismatch("array", &other)),
            },
        }
    }
}

/// Applies `selectors` to `data` in order. An empty chain returns `data`.
pub fn select(data: Value, selectors: &[Selector]) -> Result<Value, SelectorError> {
    selectors
        .iter()
        .try_fold(data, |data, selector| selector.apply(data))
}

fn mismatch(expected: &'static str, found: &Value) -> SelectorError {
    SelectorError::TypeMismatch {
        expected,
        found: kind(found),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
