use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no worker advertises task `{0}`")]
    NotFound(String),

    #[error("malformed task identifier `{0}`, expected <category>.<name>")]
    MalformedTask(String),

    #[error("control plane unavailable: {0}")]
    ControlPlane(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("task queue error: {0}")]
    Scheduler(String),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Failure to apply a selector chain to a JSON value.
#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    #[error("no element with {key} == {value}")]
    NoMatch { key: String, value: Value },

    #[error("key `{0}` not found")]
    KeyNotFound(String),

    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
