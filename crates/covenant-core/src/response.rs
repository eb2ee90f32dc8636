//! # HTTP Response & Envelopes
//!
//! The response value handed back to the connection layer, plus the two
//! wire envelopes every contract-bound route speaks:
//!
//! - success: `{"success": true, "data": ...}`
//! - error:   `{"success": false, "error": {"code", "message", "issues"?}}`
//!
//! `issues` is serialized only when present, and issue keys are kept in a
//! `BTreeMap` so envelope bytes are deterministic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Uniform success wrapper around a contract-bound payload
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope {
    /// Always `true`
    pub success: bool,
    /// Validated (or raw) handler payload
    pub data: Value,
}

impl SuccessEnvelope {
    /// Wrap a payload
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error details nested inside the error envelope
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "BAD_REQUEST")
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Field path to message; only present for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<BTreeMap<String, String>>,
}

/// Uniform error wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,
    /// The error payload
    pub error: ErrorDetail,
}

impl ErrorEnvelope {
    /// Envelope without field issues
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                issues: None,
            },
        }
    }

    /// Envelope carrying a field-level issue map
    pub fn with_issues(
        code: impl Into<String>,
        message: impl Into<String>,
        issues: BTreeMap<String, String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                issues: Some(issues),
            },
        }
    }
}

/// HTTP response value
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Content type
    pub content_type: String,
    /// Response headers
    pub headers: HashMap<String, String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
            content_type: "application/json".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl Response {
    /// Create a JSON response from a pre-serialized body
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Create a text response
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: "text/plain".to_string(),
            ..Self::default()
        }
    }

    /// Serialize a value as an application/json response
    ///
    /// Serialization of an envelope cannot realistically fail; if it ever
    /// does the client still gets a well-formed 500.
    #[must_use]
    pub fn from_value<T: Serialize>(value: &T) -> Self {
        serde_json::to_string(value).map_or_else(
            |_| {
                Self::json(r#"{"success":false,"error":{"code":"INTERNAL_SERVER_ERROR","message":"Internal server error"}}"#)
                    .with_status(500)
            },
            |body| Self::json(body),
        )
    }

    /// Set the status code
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set or override a header
    pub fn set_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("content-type") {
            self.content_type = value.to_string();
        } else {
            self.headers.insert(key.to_string(), value.to_string());
        }
    }

    /// Convert to a hyper response
    pub(crate) fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = hyper::Response::builder().status(status);
        builder = builder.header("Content-Type", &self.content_type);
        for (k, v) in &self.headers {
            if !k.eq_ignore_ascii_case("content-type") {
                builder = builder.header(k.as_str(), v.as_str());
            }
        }

        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|_| {
                hyper::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from("Internal Server Error")))
                    .expect("static fallback response")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = SuccessEnvelope::new(json!({"id": 7, "name": "Ada"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "data": {"id": 7, "name": "Ada"}})
        );
    }

    #[test]
    fn test_error_envelope_omits_absent_issues() {
        let envelope = ErrorEnvelope::new("INTERNAL_SERVER_ERROR", "Internal server error");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": {"code": "INTERNAL_SERVER_ERROR", "message": "Internal server error"}
            })
        );
    }

    #[test]
    fn test_error_envelope_with_issues() {
        let mut issues = BTreeMap::new();
        issues.insert("id".to_string(), "expected an integer".to_string());
        let envelope = ErrorEnvelope::with_issues("BAD_REQUEST", "Invalid URL parameters", issues);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": {
                    "code": "BAD_REQUEST",
                    "message": "Invalid URL parameters",
                    "issues": {"id": "expected an integer"}
                }
            })
        );
    }

    #[test]
    fn test_response_json_defaults() {
        let resp = Response::json(r#"{"status": "ok"}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/json");
    }

    #[test]
    fn test_response_with_status() {
        let resp = Response::text("Not Found").with_status(404);
        assert_eq!(resp.status, 404);
    }

    #[test]
    fn test_from_value_serializes() {
        let resp = Response::from_value(&json!({"a": 1}));
        assert_eq!(resp.body, r#"{"a":1}"#);
        assert_eq!(resp.content_type, "application/json");
    }
}
