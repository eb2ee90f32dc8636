//! # Validation Interceptor
//!
//! Enforces a route's contract on both sides of exactly one handler
//! invocation. Inbound params, query and body are validated in that
//! order, each failure short-circuiting, and the request is rewritten
//! with the parsed values so the handler sees coerced types rather than
//! raw strings. After the handler returns, its payload is validated
//! against the response schema before the success envelope is built.
//!
//! Inbound failures are the client's fault and surface as 400s with field
//! detail. A response that violates its own schema is a server fault: the
//! detail is logged and the client gets a generic 500.

use crate::contract::RouteDescriptor;
use crate::error::{Exception, HttpException};
use crate::request::Request;
use crate::response::{Response, SuccessEnvelope};
use crate::schema::Schema;
use crate::validation::{issue_map, ValidationException};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::error;

/// Wire message for params that fail their schema
const INVALID_PARAMS: &str = "Invalid URL parameters";
/// Wire message for query values that fail their schema
const INVALID_QUERY: &str = "Invalid Query Parameters";
/// Wire message for a body that fails its schema
const INVALID_BODY: &str = "Invalid Request Body";
/// Wire message when the handler's own output fails its schema
pub(crate) const INVALID_RESPONSE: &str = "Invalid server response";
/// Params arrived but the contract declares none: binder/contract drift
const PARAMS_NOT_EXPECTED: &str = "Contract expects no params, but params were received";

/// Future returned by bound handlers
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, Exception>> + Send>>;

/// A bound request handler
///
/// Consumes the (validated, rewritten) request and produces the payload
/// that response validation inspects. Failures propagate uncaught to the
/// exception filter.
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Run one request through the full contract pipeline
///
/// With no descriptor attached the request passes through untouched and
/// the handler's value is emitted without an envelope.
///
/// # Errors
///
/// Any [`Exception`] raised by validation or by the handler itself; the
/// caller hands it to the exception filter.
pub async fn intercept(
    route: Option<&RouteDescriptor>,
    mut request: Request,
    handler: &Handler,
) -> Result<Response, Exception> {
    let Some(route) = route else {
        let value = handler(request).await?;
        return Ok(Response::from_value(&value));
    };

    validate_request(route, &mut request)?;
    let data = handler(request).await?;
    let data = seal(route, data)?;
    Ok(Response::from_value(&SuccessEnvelope::new(data)))
}

/// Inbound half: params, then query, then body
fn validate_request(route: &RouteDescriptor, request: &mut Request) -> Result<(), Exception> {
    if let Some(schema) = &route.params {
        request.params = parse_section(schema, &request.params, INVALID_PARAMS)?;
    } else if request.params.as_object().is_some_and(|m| !m.is_empty()) {
        return Err(HttpException::internal_server_error(PARAMS_NOT_EXPECTED).into());
    }

    if let Some(schema) = &route.query {
        request.query = parse_section(schema, &request.query, INVALID_QUERY)?;
    }

    if let Some(schema) = &route.body {
        request.body = parse_section(schema, &request.body, INVALID_BODY)?;
    }

    Ok(())
}

fn parse_section(schema: &Schema, value: &Value, message: &str) -> Result<Value, Exception> {
    schema
        .parse(value)
        .map_err(|issues| ValidationException::new(message, &issues).into())
}

/// Outbound half: response validation and schema normalization
///
/// Validation detail stays server-side; the client only learns that the
/// response was invalid.
fn seal(route: &RouteDescriptor, data: Value) -> Result<Value, Exception> {
    let Some(schema) = &route.response else {
        return Ok(data);
    };
    match schema.parse(&data) {
        Ok(parsed) => Ok(parsed),
        Err(issues) => {
            error!(issues = ?issue_map(&issues), "response failed contract validation");
            Err(HttpException::internal_server_error(INVALID_RESPONSE).into())
        }
    }
}
