//! # Covenant Core
//!
//! Contract-enforced HTTP routing. A shared [`Contract`] declares each
//! route's method, path template and schemas; the runtime validates
//! inbound params/query/body before the handler runs, validates the
//! handler's output before it leaves, and folds every failure into one
//! JSON error envelope.
//!
//! ## Architecture
//!
//! Binding is mechanical: [`Server::bind_contract`] looks the descriptor
//! up and files it next to the handler. The interesting parts are the
//! validation pipeline (`interceptor`), which rewrites the request with
//! parsed values and seals responses, and the exception filter (`filter`),
//! the single place any error becomes a wire response.
//!
//! ## Modules
//!
//! - `server` - HTTP server built on Hyper
//! - `router` - Route matching using matchit (radix trie)
//! - `binder` - Contract lookup and route registration
//! - `contract` - Contracts, route descriptors and methods
//! - `schema` - The minimal schema validator contracts declare
//! - `interceptor` - Request/response validation pipeline
//! - `filter` - Exception to error-envelope translation
//! - `request` - HTTP request context
//! - `response` - HTTP response value and wire envelopes
//! - `validation` - Structured validation failures
//! - `json` - High-performance JSON parsing with simd-json
//! - `logging` - Tracing subscriber setup
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binder;
pub mod contract;
pub mod error;
pub mod filter;
pub mod interceptor;
pub mod json;
pub mod logging;
pub mod request;
pub mod response;
pub mod router;
pub mod schema;
pub mod server;
pub mod validation;

pub use contract::{Contract, Method, RouteDescriptor};
pub use error::{Error, Exception, HttpException, Result};
pub use interceptor::{Handler, HandlerFuture};
pub use json::{parse_json, to_json};
pub use request::Request;
pub use response::{ErrorEnvelope, Response, SuccessEnvelope};
pub use router::Router;
pub use schema::{Field, Schema};
pub use server::{Server, ServerConfig};
pub use validation::{issue_map, Issue, ValidationException};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
