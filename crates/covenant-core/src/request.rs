//! # HTTP Request
//!
//! Per-request context. Owned exclusively by the task processing the
//! request and destroyed with it; the only state the validation pipeline
//! ever mutates lives here.
//!
//! `params`, `query` and `body` hold raw values when the request is built
//! (path and query values as strings, the body as best-effort JSON) and
//! are overwritten with parsed, coerced values as the route's schemas
//! admit each section.

use crate::contract::Method;
use crate::error::{Error, Result};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HTTP request context
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
    /// Raw query string (e.g. "page=1&limit=10")
    query_string: Option<String>,
    /// Request headers
    headers: hyper::HeaderMap,
    /// Collected request body
    raw_body: Option<Bytes>,
    /// Path parameters; raw strings until a params schema rewrites them
    pub params: Value,
    /// Query values; raw strings until a query schema rewrites them
    pub query: Value,
    /// Request body as JSON; `Null` when absent or not JSON, rewritten by
    /// a body schema
    pub body: Value,
}

impl Request {
    /// Create a request directly (tests and network-free execution)
    ///
    /// `path` may carry a query string; it is split off and parsed.
    #[must_use]
    pub fn new(
        method: Method,
        path: String,
        headers_map: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Self {
        let (path, query_string) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (path, None),
        };

        let query = parse_query_string(query_string.as_deref());
        let body_json = decode_body(body.as_ref());

        let mut headers = hyper::HeaderMap::new();
        for (k, v) in headers_map {
            if let (Ok(name), Ok(value)) = (
                hyper::header::HeaderName::from_bytes(k.as_bytes()),
                hyper::header::HeaderValue::from_str(&v),
            ) {
                headers.insert(name, value);
            }
        }

        Self {
            method,
            path,
            query_string,
            headers,
            raw_body: body,
            params: Value::Object(Map::new()),
            query,
            body: body_json,
        }
    }

    /// Create from a hyper request with no body size limit
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Request::from_hyper_with_limit`].
    pub async fn from_hyper(
        method: Method,
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self> {
        Self::from_hyper_with_limit(method, req, usize::MAX).await
    }

    /// Create from a hyper request, collecting at most `max_body_size`
    /// body bytes
    ///
    /// The declared Content-Length is checked before the body is read so
    /// oversized uploads are refused without buffering them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] when the body exceeds the limit.
    pub async fn from_hyper_with_limit(
        method: Method,
        req: hyper::Request<hyper::body::Incoming>,
        max_body_size: usize,
    ) -> Result<Self> {
        let uri = req.uri();
        let path = uri.path().to_string();
        let query_string = uri.query().map(String::from);
        let query = parse_query_string(query_string.as_deref());

        let headers = req.headers().clone();
        if let Some(len) = headers.get(hyper::header::CONTENT_LENGTH) {
            if let Some(content_len) = len.to_str().ok().and_then(|s| s.parse::<usize>().ok()) {
                if content_len > max_body_size {
                    return Err(Error::PayloadTooLarge {
                        limit: max_body_size,
                        actual: content_len,
                    });
                }
            }
        }

        let raw_body = match BodyExt::collect(req.into_body()).await {
            Ok(collected) => {
                let bytes = collected.to_bytes();
                if bytes.len() > max_body_size {
                    return Err(Error::PayloadTooLarge {
                        limit: max_body_size,
                        actual: bytes.len(),
                    });
                }
                if bytes.is_empty() {
                    None
                } else {
                    Some(bytes)
                }
            }
            Err(_) => None,
        };

        let body_json = decode_body(raw_body.as_ref());

        Ok(Self {
            method,
            path,
            query_string,
            headers,
            raw_body,
            params: Value::Object(Map::new()),
            query,
            body: body_json,
        })
    }

    /// Install the raw path parameters the router extracted
    pub fn set_raw_params(&mut self, params: HashMap<String, String>) {
        let map = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<Map<String, Value>>();
        self.params = Value::Object(map);
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set or override a header
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(n), Ok(v)) = (
            hyper::header::HeaderName::from_bytes(name.as_bytes()),
            hyper::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(n, v);
        }
    }

    /// Get all headers as a HashMap
    #[must_use]
    pub fn headers_map(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|val| (k.as_str().to_string(), val.to_string()))
            })
            .collect()
    }

    /// Get the raw query string
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Get the request body as bytes
    #[must_use]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.raw_body.as_ref().map(|b| b.as_ref())
    }

    /// Get the request body as a UTF-8 string
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        self.body_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// Best-effort JSON decode of the collected body; non-JSON stays `Null`
/// and remains reachable through `body_bytes`.
fn decode_body(body: Option<&Bytes>) -> Value {
    body.and_then(|b| {
        let mut buf = b.to_vec();
        crate::json::parse_json_bytes::<Value>(&mut buf).ok()
    })
    .unwrap_or(Value::Null)
}

/// Parse a query string into a JSON object of raw string values
///
/// Handles URL decoding and duplicate keys (last value wins).
fn parse_query_string(query: Option<&str>) -> Value {
    let map = query
        .map(|q| {
            q.split('&')
                .filter_map(|pair| {
                    let mut parts = pair.splitn(2, '=');
                    let key = parts.next()?;
                    let value = parts.next().unwrap_or("");
                    Some((url_decode(key), Value::String(url_decode(value))))
                })
                .collect::<Map<String, Value>>()
        })
        .unwrap_or_default();
    Value::Object(map)
}

/// Basic URL decoding
fn url_decode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '+' => result.push(' '),
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() == 2 {
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        result.push(byte as char);
                    } else {
                        result.push('%');
                        result.push_str(&hex);
                    }
                } else {
                    result.push('%');
                    result.push_str(&hex);
                }
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_string_simple() {
        let result = parse_query_string(Some("page=1&limit=10"));
        assert_eq!(result, json!({"page": "1", "limit": "10"}));
    }

    #[test]
    fn test_parse_query_string_empty() {
        let result = parse_query_string(None);
        assert_eq!(result, json!({}));
    }

    #[test]
    fn test_parse_query_string_url_encoded() {
        let result = parse_query_string(Some("name=John+Doe&city=New%20York"));
        assert_eq!(result, json!({"name": "John Doe", "city": "New York"}));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("hello+world"), "hello world");
        assert_eq!(url_decode("hello%20world"), "hello world");
        assert_eq!(url_decode("100%25"), "100%");
    }

    #[test]
    fn test_new_splits_query_string() {
        let req = Request::new(
            Method::Get,
            "/users?page=2".to_string(),
            HashMap::new(),
            None,
        );
        assert_eq!(req.path, "/users");
        assert_eq!(req.query_string(), Some("page=2"));
        assert_eq!(req.query, json!({"page": "2"}));
    }

    #[test]
    fn test_body_decoded_as_json() {
        let req = Request::new(
            Method::Post,
            "/users".to_string(),
            HashMap::new(),
            Some(Bytes::from(r#"{"name": "Ada"}"#)),
        );
        assert_eq!(req.body, json!({"name": "Ada"}));
        assert_eq!(req.body_str(), Some(r#"{"name": "Ada"}"#));
    }

    #[test]
    fn test_non_json_body_stays_null() {
        let req = Request::new(
            Method::Post,
            "/upload".to_string(),
            HashMap::new(),
            Some(Bytes::from("plain text")),
        );
        assert_eq!(req.body, Value::Null);
        assert_eq!(req.body_bytes(), Some("plain text".as_bytes()));
    }

    #[test]
    fn test_set_raw_params() {
        let mut req = Request::new(Method::Get, "/users/7".to_string(), HashMap::new(), None);
        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());
        req.set_raw_params(params);
        assert_eq!(req.params, json!({"id": "7"}));
    }

    #[test]
    fn test_headers_round_trip() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), "abc".to_string());
        let mut req = Request::new(Method::Get, "/".to_string(), headers, None);
        assert_eq!(req.header("X-Request-Id"), Some("abc"));

        req.set_header("x-request-id", "def");
        assert_eq!(req.header("x-request-id"), Some("def"));
    }
}
