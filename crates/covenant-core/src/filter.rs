//! # Exception Filter
//!
//! The single point where any failure raised during binding, validation,
//! handler execution or response validation becomes the wire-level error
//! envelope. Categories are checked in order and the first match wins;
//! every failed request passes through exactly one of them and emits
//! exactly one response.
//!
//! Unknown errors are logged server-side in full before the client sees
//! the generic message; internal detail never leaves the process.

use crate::error::{Exception, HttpException};
use crate::interceptor::INVALID_RESPONSE;
use crate::response::{ErrorEnvelope, Response};
use tracing::error;

const CODE_BAD_REQUEST: &str = "BAD_REQUEST";
const CODE_INTERNAL: &str = "INTERNAL_SERVER_ERROR";

/// Translate an exception into the terminal error response
#[must_use]
pub fn into_response(exception: Exception) -> Response {
    match exception {
        Exception::Validation(exc) => Response::from_value(&ErrorEnvelope::with_issues(
            CODE_BAD_REQUEST,
            &exc.message,
            exc.issues,
        ))
        .with_status(400),
        Exception::Http(exc) => http_response(&exc),
        Exception::Unexpected(err) => {
            error!(error = ?err, "unhandled error while processing request");
            Response::from_value(&ErrorEnvelope::new(CODE_INTERNAL, "Internal server error"))
                .with_status(500)
        }
    }
}

/// Forward an exception that already knows its HTTP status
fn http_response(exception: &HttpException) -> Response {
    let message = exception.message();

    // The 500 raised by response validation gets a fixed body; its real
    // cause was already logged where it happened.
    if exception.status == 500 && message == INVALID_RESPONSE {
        return Response::from_value(&ErrorEnvelope::new(CODE_INTERNAL, INVALID_RESPONSE))
            .with_status(500);
    }

    let code = exception
        .error
        .as_deref()
        .map_or_else(|| CODE_INTERNAL.to_string(), derive_code);
    Response::from_value(&ErrorEnvelope::new(code, message)).with_status(exception.status)
}

/// Envelope code from an exception's error label: upper-cased, whitespace
/// runs become single underscores ("Not Found" -> "NOT_FOUND")
fn derive_code(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}
