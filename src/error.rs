use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Field-keyed validation errors, the recoverable failure class of a probe.
///
/// Missing required fields and unsafe or unreachable targets both land here;
/// the caller sees a map of field name to messages, never a transport error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error message against a field.
    pub fn add(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field} {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Reasons the URL sanitizer refuses a candidate target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("URL cannot be empty")]
    Empty,
    #[error("URL contains invalid control characters")]
    ControlCharacters,
    #[error("invalid URL format: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("target resolves to a disallowed private or loopback address")]
    PrivateTarget,
}

/// Errors surfaced by [`ProbeExecutor`](crate::ProbeExecutor).
///
/// `Validation` is a normal, reportable outcome; the other variants are
/// caller contract violations or client construction failures and propagate.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("malformed caller-supplied data: {0}")]
    CallerData(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ProbeError {
    /// The per-field error map, when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ProbeError::Validation(e) => Some(e),
            _ => None,
        }
    }
}
