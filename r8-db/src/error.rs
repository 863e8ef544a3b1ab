// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for links, results and the querier.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Details of a statement the driver rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    /// SQL text that was sent
    pub query: String,
    /// Driver error message
    pub message: String,
    /// Driver error code
    pub code: i64,
    /// Call site the failure is attributed to, if one was recorded
    pub caller: Option<&'static Location<'static>>,
}

impl QueryFailure {
    pub fn new(query: impl Into<String>, message: impl Into<String>, code: i64) -> Self {
        Self {
            query: query.into(),
            message: message.into(),
            code,
            caller: None,
        }
    }
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {}) in `{}`", self.message, self.code, self.query)?;
        if let Some(caller) = self.caller {
            write!(f, " at {caller}")?;
        }
        Ok(())
    }
}

/// Errors that can occur while talking to a database.
#[derive(Error, Debug)]
pub enum Error {
    /// Establishing the connection failed
    #[error("Failed to connect to {link}: {message} (code {code})")]
    Link {
        link: String,
        message: String,
        code: i64,
    },

    /// The driver rejected a statement
    #[error("Query failed: {0}")]
    Query(QueryFailure),

    /// The driver reported a deadlock while running a statement
    #[error("Deadlock: {0}")]
    Deadlock(QueryFailure),

    /// A caller passed a value the operation cannot work with
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// An offset fell outside the sequence it was resolved against
    #[error("Offset {offset} is out of bounds for length {length}")]
    OutOfBounds { offset: i64, length: usize },

    /// A read result was required but the statement produced something else
    #[error("Expected a read result for `{query}`, got: {dump}")]
    ResultShape { query: String, dump: String },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// True for statement failures, deadlocks included.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Deadlock(_))
    }

    /// The failed statement details, for `Query` and `Deadlock`.
    pub fn query_failure(&self) -> Option<&QueryFailure> {
        match self {
            Self::Query(failure) | Self::Deadlock(failure) => Some(failure),
            _ => None,
        }
    }

    /// Attribute a statement failure to `caller`. Other errors pass through.
    pub fn at_caller(mut self, caller: &'static Location<'static>) -> Self {
        if let Self::Query(failure) | Self::Deadlock(failure) = &mut self {
            failure.caller = Some(caller);
        }
        self
    }
}

/// Errors raised while building a [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid connection URL '{url}': {reason}")]
    Url { url: String, reason: String },

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlock_is_query() {
        let err = Error::Deadlock(QueryFailure::new("UPDATE t SET a = 1", "deadlock", 1213));
        assert!(err.is_query());
        assert_eq!(err.query_failure().unwrap().code, 1213);

        let err = Error::invalid_argument("table", "must not be empty");
        assert!(!err.is_query());
        assert!(err.query_failure().is_none());
    }

    #[test]
    fn test_at_caller_only_touches_statement_failures() {
        let here = Location::caller();
        let err = Error::Query(QueryFailure::new("BAD SQL", "syntax error", 1)).at_caller(here);
        assert_eq!(err.query_failure().unwrap().caller, Some(here));
        assert!(err.to_string().contains("BAD SQL"));

        let err = Error::OutOfBounds {
            offset: 7,
            length: 5,
        }
        .at_caller(here);
        assert_eq!(err.to_string(), "Offset 7 is out of bounds for length 5");
    }
}
