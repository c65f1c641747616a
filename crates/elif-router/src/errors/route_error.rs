//! Registration-time errors
//!
//! Everything in here is fatal at startup: a registry that produced one of
//! these errors must not be handed to a dispatcher.

use crate::routing::HttpMethod;
use std::fmt;
use thiserror::Error;

/// Result type for route registration
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors raised while building a route registry
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid constraint in '{pattern}': {reason}")]
    InvalidConstraint { pattern: String, reason: String },

    #[error("Unknown named constraint '<{name}>' in '{pattern}'")]
    UnknownConstraint { pattern: String, name: String },

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

impl RouteError {
    pub(crate) fn invalid_pattern<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        RouteError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is an ambiguity between two registrations
    pub fn is_conflict(&self) -> bool {
        matches!(self, RouteError::Conflict(_))
    }
}

/// What made two registrations ambiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Same method and same pattern registered twice
    DuplicateRoute,
    /// Two parameters at the same position with different names
    ParamNameMismatch,
    /// Two wildcards at the same position with different names or constraints
    WildcardMismatch,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::DuplicateRoute => write!(f, "duplicate route"),
            ConflictKind::ParamNameMismatch => write!(f, "parameter name mismatch"),
            ConflictKind::WildcardMismatch => write!(f, "wildcard mismatch"),
        }
    }
}

/// Two registrations that cannot coexist in the same trie
#[derive(Error, Debug, Clone)]
#[error("Route conflict ({kind}): {} {pattern} conflicts with {existing}", method_label(.method))]
pub struct ConflictError {
    pub kind: ConflictKind,
    /// `None` for method-agnostic registrations
    pub method: Option<HttpMethod>,
    pub pattern: String,
    pub existing: String,
}

fn method_label(method: &Option<HttpMethod>) -> String {
    match method {
        Some(method) => method.to_string(),
        None => "ANY".to_string(),
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}' (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

impl ConfigError {
    pub fn validation_failed<T: Into<String>>(message: T) -> Self {
        ConfigError::ValidationFailed(message.into())
    }
}
