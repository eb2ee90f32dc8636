//! # Error Handling
//!
//! Centralized error types for the Covenant core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Two families live here. [`Error`] covers configuration and
//! infrastructure faults that surface at startup or registration time.
//! [`Exception`] covers everything raised while one bound request is in
//! flight; the exception filter is its only consumer and turns each
//! variant into exactly one wire-level error envelope.

use crate::validation::ValidationException;
use thiserror::Error;

/// Result type alias for Covenant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and infrastructure errors
///
/// None of these participate in the per-request error envelope; a bad
/// contract binding or a failed socket bind should fail loudly before the
/// server accepts traffic.
#[derive(Error, Debug)]
pub enum Error {
    /// Server failed to bind to the specified address
    #[error("Failed to bind server to {address}: {source}")]
    Bind {
        /// The address we tried to bind to
        address: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A contract lookup during binding did not find the named route
    #[error("Route '{route}' not found in contract '{contract}'")]
    RouteNotInContract {
        /// Contract that was consulted
        contract: String,
        /// The missing route name
        route: String,
    },

    /// Invalid route pattern provided
    #[error("Invalid route pattern: {pattern}: {reason}")]
    InvalidRoutePattern {
        /// The invalid pattern
        pattern: String,
        /// Reason for invalidity
        reason: String,
    },

    /// HTTP protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON input could not be parsed
    #[error("JSON parse error: {reason}")]
    JsonParse {
        /// Parser diagnostic
        reason: String,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request payload too large
    #[error("Payload too large: limit={limit} bytes, received={actual} bytes")]
    PayloadTooLarge {
        /// Max allowed size
        limit: usize,
        /// Actual size
        actual: usize,
    },
}

/// An error that already carries an HTTP status and payload
///
/// Raised by handlers (or the pipeline itself) that know their wire
/// status. The exception filter forwards the status unchanged and derives
/// the envelope code from the error label when one is present.
#[derive(Debug, Clone, Error)]
#[error("HTTP {status}: {}", .messages.join(", "))]
pub struct HttpException {
    /// HTTP status code to emit
    pub status: u16,
    /// Error label (e.g. "Forbidden"); the envelope code derives from it
    pub error: Option<String>,
    /// One or more messages; multiple are joined with ", " on the wire
    pub messages: Vec<String>,
}

impl HttpException {
    /// Create an exception with a single message
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
            messages: vec![message.into()],
        }
    }

    /// Create an exception carrying several messages
    pub fn with_messages(status: u16, error: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
            messages,
        }
    }

    /// 500 with the "Internal Server Error" label
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(500, "Internal Server Error", message)
    }

    /// 400 with the "Bad Request" label
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", message)
    }

    /// 403 with the "Forbidden" label
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, "Forbidden", message)
    }

    /// 404 for paths no route matches
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(404, "Not Found", "Not Found")
    }

    /// 413 for bodies over the configured limit
    #[must_use]
    pub fn payload_too_large() -> Self {
        Self::new(413, "Payload Too Large", "Payload Too Large")
    }

    /// The wire message: all messages joined with ", "
    #[must_use]
    pub fn message(&self) -> String {
        self.messages.join(", ")
    }
}

/// Any failure raised while processing one bound request
///
/// Variants map one-to-one onto the exception filter's translation table;
/// every request that fails passes through exactly one of them.
#[derive(Debug, Error)]
pub enum Exception {
    /// Request data failed contract validation
    #[error("{0}")]
    Validation(#[from] ValidationException),

    /// An error already carrying an HTTP status and payload
    #[error("{0}")]
    Http(#[from] HttpException),

    /// Anything else; logged in full server-side, reported generically
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_in_contract_error() {
        let err = Error::RouteNotInContract {
            contract: "users".to_string(),
            route: "GetUser".to_string(),
        };
        assert!(err.to_string().contains("GetUser"));
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_bind_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = Error::Bind {
            address: "0.0.0.0:8000".to_string(),
            source: io_err,
        };
        assert!(err.to_string().contains("0.0.0.0:8000"));
    }

    #[test]
    fn test_http_exception_message_join() {
        let exc = HttpException::with_messages(
            400,
            "Bad Request",
            vec!["name is required".to_string(), "age must be positive".to_string()],
        );
        assert_eq!(exc.message(), "name is required, age must be positive");
    }

    #[test]
    fn test_http_exception_display() {
        let exc = HttpException::forbidden("insufficient permissions");
        assert_eq!(exc.to_string(), "HTTP 403: insufficient permissions");
    }

    #[test]
    fn test_exception_from_anyhow() {
        let exc = Exception::from(anyhow::anyhow!("boom"));
        assert!(matches!(exc, Exception::Unexpected(_)));
    }
}
