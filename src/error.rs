//! Error types
//!
//! Every failure the engine can report, grouped the way the command layer
//! needs to present them: configuration problems are raised before any
//! network call, transport errors keep the endpoint they came from.

use std::path::PathBuf;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid combination of flags, missing project, aborted prompt...
    #[error("{0}")]
    Config(String),

    /// Required creation fields left unset
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Filter, format or column expression that failed to compile or evaluate
    #[error("invalid expression {expression:?}: {reason}")]
    Expression { expression: String, reason: String },

    /// Parameters given through a file, stdin or the editor are unusable
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Embedded API schema could not be used
    #[error("invalid API schema: {0}")]
    Schema(String),

    /// Non-2xx answer or connection failure
    #[error("{method} {endpoint} failed: {message}")]
    Transport {
        method: String,
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// Locate scan exhausted every region
    #[error("no {kind} found with id {id}")]
    NotFound { kind: String, id: String },

    #[error("file {} already exists (use --replace to overwrite it)", .0.display())]
    FileExists(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Selection prompt or external editor failure
    #[error("terminal interaction failed: {0}")]
    Interaction(String),

    /// A spawned fetch task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn expression(expression: &str, reason: impl ToString) -> Self {
        Self::Expression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status of a transport error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Errors detected locally, before anything was sent to the API
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::MissingFields(_)
                | Self::Expression { .. }
                | Self::InvalidParameters(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_field() {
        let err = Error::MissingFields(vec!["login".into(), "email".into()]);
        assert_eq!(err.to_string(), "missing required field(s): login, email");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_transport_error_keeps_endpoint() {
        let err = Error::Transport {
            method: "GET".into(),
            endpoint: "/v1/cloud/project/p/region".into(),
            status: Some(403),
            message: "403 Forbidden: This call has not been granted".into(),
        };
        assert_eq!(
            err.to_string(),
            "GET /v1/cloud/project/p/region failed: 403 Forbidden: This call has not been granted"
        );
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_not_found_names_identifier() {
        let err = Error::NotFound {
            kind: "loadbalancer".into(),
            id: "fakeLB".into(),
        };
        assert_eq!(err.to_string(), "no loadbalancer found with id fakeLB");
    }
}
