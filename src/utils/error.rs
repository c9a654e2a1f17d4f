//! Error handling module
//!
//! Defines error types, the user-facing message table and handling helpers

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Fallback message when a failure envelope carries no message
pub const REQUEST_FAILED: &str = "Request failed";

/// Fallback message when a transport failure carries no usable message
pub const NETWORK_ERROR: &str = "Network error";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The server responded but the envelope reports failure
    #[error("{message}")]
    Application {
        /// User-facing message from the envelope
        message: String,
    },

    /// The request never completed successfully
    #[error("{message}")]
    Transport {
        /// Best available message
        message: String,
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Failure classification
        kind: TransportKind,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted store error
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),
}

/// Classification of transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The configured timeout elapsed
    Timeout,
    /// Connection could not be established
    Connect,
    /// A non-2xx response was received
    Status,
    /// Anything else (request building, body decoding, ...)
    Other,
}

impl TransportKind {
    /// Low-level error code, in the vocabulary of the code mapping table
    pub fn code(&self) -> Option<&'static str> {
        match self {
            TransportKind::Timeout => Some("ECONNABORTED"),
            TransportKind::Connect => Some("ECONNREFUSED"),
            TransportKind::Status | TransportKind::Other => None,
        }
    }
}

/// Keys of the user-facing message table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkError,
    ServerError,
    TimeoutError,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl ErrorKind {
    /// Table key
    pub fn key(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::TimeoutError => "TIMEOUT_ERROR",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
        }
    }

    /// Human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "Network connection failed, please try again",
            ErrorKind::ServerError => "Server error, please contact administrator",
            ErrorKind::TimeoutError => "Request timeout, please try again",
            ErrorKind::Unauthorized => "Authentication failed, please login again",
            ErrorKind::Forbidden => "No permission to access this resource",
            ErrorKind::NotFound => "Requested resource not found",
        }
    }

    /// Look up a kind by its table key
    pub fn from_key(key: &str) -> Option<Self> {
        ALL_KINDS.iter().copied().find(|kind| kind.key() == key)
    }
}

const ALL_KINDS: [ErrorKind; 6] = [
    ErrorKind::NetworkError,
    ErrorKind::ServerError,
    ErrorKind::TimeoutError,
    ErrorKind::Unauthorized,
    ErrorKind::Forbidden,
    ErrorKind::NotFound,
];

/// Low-level error code to message key mapping
static CODE_MAPPING: Lazy<HashMap<&'static str, ErrorKind>> = Lazy::new(|| {
    HashMap::from([
        ("ECONNABORTED", ErrorKind::TimeoutError),
        ("ENOTFOUND", ErrorKind::NetworkError),
        ("ECONNREFUSED", ErrorKind::NetworkError),
    ])
});

/// Map a low-level error code through the code table
pub fn map_error_code(code: &str) -> Option<ErrorKind> {
    CODE_MAPPING.get(code).copied()
}

/// Message for a table key, or the key itself when unknown
pub fn error_message(key: &str) -> String {
    ErrorKind::from_key(key)
        .map(|kind| kind.message().to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Error record as seen by message lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Low-level error code (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Message (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Resolve an error record to display text
///
/// Mapped code wins, then the record's own message, then the generic server error.
pub fn error_record_message(record: &ErrorRecord) -> String {
    if let Some(kind) = record.code.as_deref().and_then(map_error_code) {
        return kind.message().to_string();
    }

    match record.message.as_deref() {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => ErrorKind::ServerError.message().to_string(),
    }
}

/// Pick the best available transport failure message
pub fn best_message(server: Option<&str>, library: Option<&str>) -> String {
    [server, library]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|message| !message.is_empty())
        .unwrap_or(NETWORK_ERROR)
        .to_string()
}

impl AppError {
    /// Create an application error, falling back to the generic failure text
    pub fn application(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| REQUEST_FAILED.to_string());
        AppError::Application { message }
    }

    /// Convert a reqwest failure into a transport error
    pub fn from_reqwest(err: &reqwest::Error, server_message: Option<&str>) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else if err.is_status() {
            TransportKind::Status
        } else {
            TransportKind::Other
        };

        AppError::Transport {
            message: best_message(server_message, Some(&err.to_string())),
            status: err.status().map(|s| s.as_u16()),
            kind,
        }
    }

    /// Whether the server answered with a failure envelope
    pub fn is_application(&self) -> bool {
        matches!(self, AppError::Application { .. })
    }

    /// Whether the request never completed successfully
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Transport { .. })
    }

    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Error record for message lookup
    pub fn error_record(&self) -> ErrorRecord {
        let code = match self {
            AppError::Transport { kind, .. } => kind.code().map(str::to_string),
            _ => None,
        };

        ErrorRecord {
            code,
            message: Some(self.to_string()),
        }
    }

    /// Display text after the message table has been applied
    pub fn user_message(&self) -> String {
        error_record_message(&self.error_record())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_fallback() {
        let err = AppError::application(None);
        assert_eq!(err.to_string(), REQUEST_FAILED);

        let err = AppError::application(Some(String::new()));
        assert_eq!(err.to_string(), REQUEST_FAILED);

        let err = AppError::application(Some("Strategy not found".to_string()));
        assert_eq!(err.to_string(), "Strategy not found");
        assert!(err.is_application());
    }

    #[test]
    fn test_best_message_precedence() {
        assert_eq!(best_message(Some("quota exceeded"), Some("status 400")), "quota exceeded");
        assert_eq!(best_message(None, Some("connection refused")), "connection refused");
        assert_eq!(best_message(Some("  "), None), NETWORK_ERROR);
        assert_eq!(best_message(None, None), NETWORK_ERROR);
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(ErrorKind::from_key("FORBIDDEN"), Some(ErrorKind::Forbidden));
        assert_eq!(ErrorKind::from_key("forbidden"), None);
    }

    #[test]
    fn test_transport_user_message() {
        let err = AppError::Transport {
            message: "operation timed out".to_string(),
            status: None,
            kind: TransportKind::Timeout,
        };
        assert_eq!(err.user_message(), ErrorKind::TimeoutError.message());

        let err = AppError::Transport {
            message: "bad gateway".to_string(),
            status: Some(502),
            kind: TransportKind::Status,
        };
        assert_eq!(err.user_message(), "bad gateway");
        assert_eq!(err.status(), Some(502));
    }
}
