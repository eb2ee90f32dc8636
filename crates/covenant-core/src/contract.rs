//! # Contracts
//!
//! Shared route descriptions. A [`Contract`] is a named, immutable map
//! from route name to [`RouteDescriptor`]; the binder looks descriptors up
//! at registration time and the validation pipeline reads them on every
//! request. Nothing here is written after construction.

use crate::schema::Schema;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// HTTP methods a contract route can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
}

impl Method {
    /// Map a wire-level method onto the contract enumeration
    ///
    /// Methods outside the contract set (HEAD, OPTIONS, ...) return `None`
    /// and fall through to the not-found path.
    #[must_use]
    pub fn from_http(method: &hyper::Method) -> Option<Self> {
        match *method {
            hyper::Method::GET => Some(Self::Get),
            hyper::Method::POST => Some(Self::Post),
            hyper::Method::PUT => Some(Self::Put),
            hyper::Method::PATCH => Some(Self::Patch),
            hyper::Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Immutable description of one endpoint
///
/// Created once at contract-definition time and shared read-only by every
/// request matching the route. A schema left as `None` means the section
/// carries no constraint and no coercion.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// HTTP method
    pub method: Method,
    /// Path template with `{name}` placeholders (e.g. "/users/{id}")
    pub path_template: String,
    /// Schema for URL path parameters
    pub params: Option<Schema>,
    /// Schema for query string values
    pub query: Option<Schema>,
    /// Schema for the request body
    pub body: Option<Schema>,
    /// Schema for success-path response data
    pub response: Option<Schema>,
}

impl RouteDescriptor {
    /// Create a descriptor with no schemas attached
    pub fn new(method: Method, path_template: impl Into<String>) -> Self {
        Self {
            method,
            path_template: path_template.into(),
            params: None,
            query: None,
            body: None,
            response: None,
        }
    }

    /// GET descriptor
    pub fn get(path_template: impl Into<String>) -> Self {
        Self::new(Method::Get, path_template)
    }

    /// POST descriptor
    pub fn post(path_template: impl Into<String>) -> Self {
        Self::new(Method::Post, path_template)
    }

    /// PUT descriptor
    pub fn put(path_template: impl Into<String>) -> Self {
        Self::new(Method::Put, path_template)
    }

    /// PATCH descriptor
    pub fn patch(path_template: impl Into<String>) -> Self {
        Self::new(Method::Patch, path_template)
    }

    /// DELETE descriptor
    pub fn delete(path_template: impl Into<String>) -> Self {
        Self::new(Method::Delete, path_template)
    }

    /// Attach a schema for URL path parameters
    #[must_use]
    pub fn with_params(mut self, schema: Schema) -> Self {
        self.params = Some(schema);
        self
    }

    /// Attach a schema for query string values
    #[must_use]
    pub fn with_query(mut self, schema: Schema) -> Self {
        self.query = Some(schema);
        self
    }

    /// Attach a schema for the request body
    #[must_use]
    pub fn with_body(mut self, schema: Schema) -> Self {
        self.body = Some(schema);
        self
    }

    /// Attach a schema for success-path response data
    #[must_use]
    pub fn with_response(mut self, schema: Schema) -> Self {
        self.response = Some(schema);
        self
    }
}

/// Named, immutable collection of route descriptors
///
/// Built once at startup, then only read. Descriptors are handed out as
/// `Arc`s so arbitrarily many concurrent requests share them without
/// synchronization.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    name: String,
    routes: HashMap<String, Arc<RouteDescriptor>>,
}

impl Contract {
    /// Create an empty contract
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: HashMap::new(),
        }
    }

    /// Add a named route
    #[must_use]
    pub fn with_route(mut self, route_name: impl Into<String>, route: RouteDescriptor) -> Self {
        self.routes.insert(route_name.into(), Arc::new(route));
        self
    }

    /// Look up a route descriptor by name
    #[must_use]
    pub fn route(&self, route_name: &str) -> Option<Arc<RouteDescriptor>> {
        self.routes.get(route_name).cloned()
    }

    /// Contract name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the contract declares no routes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Schema};

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_method_from_http() {
        assert_eq!(Method::from_http(&hyper::Method::POST), Some(Method::Post));
        assert_eq!(Method::from_http(&hyper::Method::HEAD), None);
    }

    #[test]
    fn test_descriptor_builder() {
        let route = RouteDescriptor::get("/users/{id}")
            .with_params(Schema::object(vec![Field::required("id", Schema::integer())]))
            .with_response(Schema::object(vec![Field::required("id", Schema::integer())]));
        assert_eq!(route.method, Method::Get);
        assert_eq!(route.path_template, "/users/{id}");
        assert!(route.params.is_some());
        assert!(route.query.is_none());
        assert!(route.response.is_some());
    }

    #[test]
    fn test_contract_lookup() {
        let contract = Contract::new("users")
            .with_route("GetUser", RouteDescriptor::get("/users/{id}"))
            .with_route("CreateUser", RouteDescriptor::post("/users"));

        assert_eq!(contract.name(), "users");
        assert_eq!(contract.len(), 2);
        assert!(contract.route("GetUser").is_some());
        assert!(contract.route("DeleteUser").is_none());
    }

    #[test]
    fn test_descriptors_shared_by_clone() {
        let contract = Contract::new("users").with_route("GetUser", RouteDescriptor::get("/users/{id}"));
        let a = contract.route("GetUser").unwrap();
        let b = contract.route("GetUser").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
