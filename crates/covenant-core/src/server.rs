//! # HTTP Server
//!
//! HTTP/1 server built on Hyper and Tokio with graceful shutdown.
//!
//! Dispatch is deliberately small: match the route, hand the request and
//! its bound descriptor to the validation pipeline, and let the exception
//! filter render anything that went wrong. Routing tables are written only
//! before [`Server::serve`] runs; afterwards every shared structure is
//! read-only behind an `Arc`.

use crate::binder::BoundRoute;
use crate::contract::Method;
use crate::error::{Error, Exception, HttpException, Result};
use crate::filter;
use crate::interceptor;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
pub use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// HTTP Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: SocketAddr,
    /// Enable keep-alive connections
    pub keep_alive: bool,
    /// Shutdown timeout for graceful shutdown (default: 30 seconds)
    pub shutdown_timeout: Duration,
    /// Max request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 8000).into(),
            keep_alive: true,
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
        }
    }
}

/// Contract-enforcing HTTP server
#[derive(Clone, Default)]
pub struct Server {
    pub(crate) config: ServerConfig,
    pub(crate) router: Router,
    pub(crate) routes: Vec<BoundRoute>,
}

impl Server {
    /// Create a server with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address to serve on
    #[must_use]
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.address = addr;
        self
    }

    /// Set the max request body size
    pub fn set_max_body_size(&mut self, bytes: usize) {
        self.config.max_body_size = bytes;
    }

    /// Start the server with graceful shutdown
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] when the address cannot be bound and IO
    /// errors from the accept loop.
    pub async fn serve(&self) -> Result<()> {
        let addr = self.config.address;

        let socket = tokio::net::TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        #[cfg(not(windows))]
        {
            socket.set_reuseport(true)?;
        }
        socket.bind(addr).map_err(|e| Error::Bind {
            address: addr.to_string(),
            source: e,
        })?;

        let listener = socket.listen(1024)?;

        info!("Server listening on http://{addr}");

        let router = Arc::new(self.router.clone());
        let routes = Arc::new(self.routes.clone());
        let active = Arc::new(AtomicUsize::new(0));
        let max_body_size = self.config.max_body_size;
        let keep_alive = self.config.keep_alive;

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, remote_addr) = accept_result?;
                    let io = TokioIo::new(stream);

                    let router = router.clone();
                    let routes = routes.clone();
                    let active = active.clone();

                    tokio::task::spawn(async move {
                        active.fetch_add(1, Ordering::Relaxed);

                        if let Err(err) = http1::Builder::new()
                            .keep_alive(keep_alive)
                            .serve_connection(io, service_fn(move |req| {
                                let router = router.clone();
                                let routes = routes.clone();
                                async move {
                                    let method = req.method().clone();
                                    let path = req.uri().path().to_string();
                                    let version = format!("{:?}", req.version());

                                    let response = handle_request(
                                        req,
                                        &router,
                                        &routes,
                                        remote_addr,
                                        max_body_size,
                                    )
                                    .await;

                                    info!(
                                        "    {} - \"{} {} {}\" {}",
                                        remote_addr, method, path, version, response.status
                                    );
                                    Ok::<_, hyper::Error>(response.into_hyper())
                                }
                            }))
                            .await
                        {
                            error!("Error serving connection: {err:?}");
                        }
                        active.fetch_sub(1, Ordering::Relaxed);
                    });
                }
                _ = shutdown_signal() => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        let timeout = self.config.shutdown_timeout;
        let drain = async {
            loop {
                if active.load(Ordering::Relaxed) == 0 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        let _ = tokio::time::timeout(timeout, drain).await;
        Ok(())
    }

    /// Execute a request directly without the network stack
    pub async fn test_request(
        &self,
        method: Method,
        path: String,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Response {
        if let Some(b) = body.as_ref() {
            if b.len() > self.config.max_body_size {
                return filter::into_response(Exception::Http(HttpException::payload_too_large()));
            }
        }
        let mut request = Request::new(method, path, headers, body);
        request.set_header("x-client-ip", "test");

        process_request(request, &self.router, &self.routes).await
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}

/// Core request processing (network agnostic)
///
/// Exactly one response comes out of here, success or not; any exception
/// from the pipeline is rendered by the filter and nothing else emits.
async fn process_request(mut request: Request, router: &Router, routes: &[BoundRoute]) -> Response {
    if request.header("x-request-id").is_none() {
        let request_id = generate_request_id();
        request.set_header("x-request-id", &request_id);
    }
    let request_id = request.header("x-request-id").map(ToString::to_string);

    let Some(matched) = router.match_route(request.method, &request.path) else {
        return finalize(
            filter::into_response(Exception::Http(HttpException::not_found())),
            request_id.as_deref(),
        );
    };
    request.set_raw_params(matched.params);

    let bound = &routes[matched.handler_id];
    let response =
        match interceptor::intercept(bound.descriptor.as_deref(), request, &bound.handler).await {
            Ok(response) => response,
            Err(exception) => filter::into_response(exception),
        };
    finalize(response, request_id.as_deref())
}

fn finalize(mut response: Response, request_id: Option<&str>) -> Response {
    if let Some(id) = request_id {
        response.set_header("x-request-id", id);
    }
    response
}

async fn handle_request(
    req: hyper::Request<hyper::body::Incoming>,
    router: &Router,
    routes: &[BoundRoute],
    remote_addr: SocketAddr,
    max_body_size: usize,
) -> Response {
    let Some(method) = Method::from_http(req.method()) else {
        return filter::into_response(Exception::Http(HttpException::not_found()));
    };

    match Request::from_hyper_with_limit(method, req, max_body_size).await {
        Ok(mut request) => {
            request.set_header("x-client-ip", &remote_addr.ip().to_string());
            process_request(request, router, routes).await
        }
        Err(Error::PayloadTooLarge { .. }) => {
            filter::into_response(Exception::Http(HttpException::payload_too_large()))
        }
        Err(e) => {
            error!("Failed to read request: {e}");
            filter::into_response(Exception::Http(HttpException::bad_request("Bad Request")))
        }
    }
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now.as_nanos(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Contract, RouteDescriptor};
    use crate::interceptor::{Handler, HandlerFuture};
    use crate::schema::{Field, Schema};
    use serde_json::{json, Value};

    fn user_contract() -> Contract {
        Contract::new("users").with_route(
            "GetUser",
            RouteDescriptor::get("/users/{id}")
                .with_params(Schema::object(vec![Field::required("id", Schema::integer())]))
                .with_response(Schema::object(vec![
                    Field::required("id", Schema::integer()),
                    Field::required("name", Schema::string()),
                ])),
        )
    }

    fn get_user_handler() -> Handler {
        Arc::new(|req: Request| -> HandlerFuture {
            Box::pin(async move {
                let id = req.params["id"].clone();
                Ok(json!({"id": id, "name": "Ada"}))
            })
        })
    }

    fn body(response: &Response) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 8000);
        assert!(config.keep_alive);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_get_user_success_with_coerced_param() {
        let mut server = Server::new();
        server
            .bind_contract(&user_contract(), "GetUser", get_user_handler())
            .unwrap();

        let response = server
            .test_request(Method::Get, "/users/7".to_string(), HashMap::new(), None)
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(
            body(&response),
            json!({"success": true, "data": {"id": 7, "name": "Ada"}})
        );
    }

    #[tokio::test]
    async fn test_get_user_invalid_param_is_400() {
        let mut server = Server::new();
        server
            .bind_contract(&user_contract(), "GetUser", get_user_handler())
            .unwrap();

        let response = server
            .test_request(Method::Get, "/users/abc".to_string(), HashMap::new(), None)
            .await;

        assert_eq!(response.status, 400);
        assert_eq!(
            body(&response),
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

    #[tokio::test]
    async fn test_handler_http_exception_forwarded() {
        let contract =
            Contract::new("users").with_route("DeleteUser", RouteDescriptor::delete("/users"));
        let handler: Handler = Arc::new(|_req: Request| -> HandlerFuture {
            Box::pin(async move { Err(HttpException::forbidden("admin role required").into()) })
        });
        let mut server = Server::new();
        server.bind_contract(&contract, "DeleteUser", handler).unwrap();

        let response = server
            .test_request(Method::Delete, "/users".to_string(), HashMap::new(), None)
            .await;

        assert_eq!(response.status, 403);
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "error": {"code": "FORBIDDEN", "message": "admin role required"}
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_error_detail_is_hidden() {
        let contract = Contract::new("users").with_route("ListUsers", RouteDescriptor::get("/users"));
        let handler: Handler = Arc::new(|_req: Request| -> HandlerFuture {
            Box::pin(async move { Err(anyhow::anyhow!("connection pool exhausted").into()) })
        });
        let mut server = Server::new();
        server.bind_contract(&contract, "ListUsers", handler).unwrap();

        let response = server
            .test_request(Method::Get, "/users".to_string(), HashMap::new(), None)
            .await;

        assert_eq!(response.status, 500);
        assert!(!response.body.contains("connection pool exhausted"));
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "error": {"code": "INTERNAL_SERVER_ERROR", "message": "Internal server error"}
            })
        );
    }

    #[tokio::test]
    async fn test_unmatched_route_is_enveloped_404() {
        let server = Server::new();
        let response = server
            .test_request(Method::Get, "/nope".to_string(), HashMap::new(), None)
            .await;

        assert_eq!(response.status, 404);
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "error": {"code": "NOT_FOUND", "message": "Not Found"}
            })
        );
    }

    #[tokio::test]
    async fn test_payload_too_large_is_enveloped_413() {
        let contract = Contract::new("users").with_route("CreateUser", RouteDescriptor::post("/users"));
        let mut server = Server::new();
        server.set_max_body_size(8);
        server
            .bind_contract(&contract, "CreateUser", get_user_handler())
            .unwrap();

        let response = server
            .test_request(
                Method::Post,
                "/users".to_string(),
                HashMap::new(),
                Some(Bytes::from(r#"{"name": "far too long"}"#)),
            )
            .await;

        assert_eq!(response.status, 413);
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "error": {"code": "PAYLOAD_TOO_LARGE", "message": "Payload Too Large"}
            })
        );
    }

    #[tokio::test]
    async fn test_request_id_echoed_on_response() {
        let mut server = Server::new();
        server
            .bind_contract(&user_contract(), "GetUser", get_user_handler())
            .unwrap();

        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), "req-42".to_string());
        let response = server
            .test_request(Method::Get, "/users/7".to_string(), headers, None)
            .await;

        assert_eq!(
            response.headers.get("x-request-id").map(String::as_str),
            Some("req-42")
        );
    }

    #[tokio::test]
    async fn test_uncontracted_route_skips_envelope() {
        let handler: Handler = Arc::new(|_req: Request| -> HandlerFuture {
            Box::pin(async move { Ok(json!({"status": "healthy"})) })
        });
        let mut server = Server::new();
        server.add_route(Method::Get, "/health", handler).unwrap();

        let response = server
            .test_request(Method::Get, "/health".to_string(), HashMap::new(), None)
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(body(&response), json!({"status": "healthy"}));
    }
}
