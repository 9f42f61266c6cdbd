/// HTTP endpoint for the climate API
///
/// Endpoints:
/// - GET / - Welcome text listing the routes
/// - GET /api/v1.0/precipitation - Precipitation after the cutoff date
/// - GET /api/v1.0/stations - Every station
/// - GET /api/v1.0/tobs - Recent temperature observations for one station
/// - GET /api/v1.0/{start} - Temperature stats from `start` onward
/// - GET /api/v1.0/{start}/{end} - Temperature stats between two dates
/// - GET /health - Service health check
///
/// Each request opens its own store session, runs one query and drops the
/// session before the response is sent. Store failures become 500s.

use crate::format;
use crate::query::QueryLayer;
use crate::store::{Session, Store, StoreError};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request};

const API_PREFIX: &str = "/api/v1.0/";

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start_date}",
    "/api/v1.0/{start_date}/{end_date}",
];

const WELCOME: &str = "Welcome to the Hawaii climate API!<br/>\
Available Routes:<br/>\
/api/v1.0/precipitation<br/>\
/api/v1.0/stations<br/>\
/api/v1.0/tobs<br/>\
/api/v1.0/&lt;start_date&gt;<br/>\
/api/v1.0/&lt;start_date&gt;/&lt;end_date&gt;<br/>\
Dates are formatted yyyy-mm-dd.";

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// A parsed request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Health,
    Precipitation,
    Stations,
    Tobs,
    StatsFrom(String),
    StatsRange(String, String),
    NotFound,
}

impl Route {
    /// Match a request target. The query string is ignored and the path is
    /// percent-decoded before it is split, so `%2F` separates segments;
    /// named routes take priority over the date patterns, so
    /// `/api/v1.0/tobs` is never read as a start date.
    pub fn parse(target: &str) -> Route {
        let raw = target.split(['?', '#']).next().unwrap_or_default();
        let Ok(path) = urlencoding::decode(raw) else {
            return Route::NotFound;
        };

        match &*path {
            "/" => return Route::Home,
            "/health" => return Route::Health,
            _ => {}
        }

        let Some(rest) = path.strip_prefix(API_PREFIX) else {
            return Route::NotFound;
        };
        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Route::NotFound;
        }

        match segments.as_slice() {
            ["precipitation"] => Route::Precipitation,
            ["stations"] => Route::Stations,
            ["tobs"] => Route::Tobs,
            [start] => Route::StatsFrom(start.to_string()),
            [start, end] => Route::StatsRange(start.to_string(), end.to_string()),
            _ => Route::NotFound,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Transport-independent response: status, content type, body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> ApiResponse {
        match serde_json::to_string_pretty(value) {
            Ok(body) => ApiResponse {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                log::error!("Failed to serialize response: {}", e);
                ApiResponse {
                    status: 500,
                    content_type: "application/json",
                    body: r#"{"error": "Failed to serialize response"}"#.to_string(),
                }
            }
        }
    }

    fn html(body: &str) -> ApiResponse {
        ApiResponse {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn into_tiny_http(self) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
        let mut response = tiny_http::Response::from_data(self.body.into_bytes())
            .with_status_code(tiny_http::StatusCode::from(self.status));
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            response = response.with_header(header);
        }
        response
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Everything a request handler needs: the store handle and the fixed
/// query parameters. Shared read-only across worker threads.
pub struct ApiContext {
    store: Arc<dyn Store>,
    queries: QueryLayer,
}

impl ApiContext {
    pub fn new(store: Arc<dyn Store>, queries: QueryLayer) -> Self {
        Self { store, queries }
    }

    /// Route and answer one request.
    pub fn handle(&self, method: &Method, target: &str) -> ApiResponse {
        if !matches!(method, Method::Get | Method::Head) {
            return ApiResponse::json(
                405,
                &serde_json::json!({
                    "error": "Method not allowed",
                    "allowed": ["GET", "HEAD"]
                }),
            );
        }

        match Route::parse(target) {
            Route::Home => ApiResponse::html(WELCOME),
            Route::Health => handle_health(self.store.backend()),
            Route::Precipitation => self.with_session(|q, s| {
                q.fetch_precipitation(s).map(|rows| format::precipitation(&rows))
            }),
            Route::Stations => self.with_session(|q, s| {
                q.fetch_stations(s).map(|rows| format::stations(&rows))
            }),
            Route::Tobs => self.with_session(|q, s| {
                q.fetch_recent_observations(s).map(|rows| format::observations(&rows))
            }),
            Route::StatsFrom(start) => self.with_session(|q, s| {
                q.fetch_stats_from(s, &start)
                    .map(|rows| format::temperature_stats(&rows))
            }),
            Route::StatsRange(start, end) => self.with_session(|q, s| {
                q.fetch_stats_range(s, &start, &end)
                    .map(|rows| format::temperature_stats(&rows))
            }),
            Route::NotFound => ApiResponse::json(
                404,
                &serde_json::json!({
                    "error": "Not found",
                    "available_endpoints": AVAILABLE_ENDPOINTS
                }),
            ),
        }
    }

    /// Run `query` on a fresh session. The session is dropped before the
    /// body is serialized, whether or not the query succeeded.
    fn with_session<T, F>(&self, query: F) -> ApiResponse
    where
        T: Serialize,
        F: FnOnce(&QueryLayer, &mut dyn Session) -> Result<T, StoreError>,
    {
        let result = self
            .store
            .open()
            .and_then(|mut session| query(&self.queries, session.as_mut()));

        match result {
            Ok(body) => ApiResponse::json(200, &body),
            Err(e) => {
                log::error!("Store query failed: {}", e);
                ApiResponse::json(500, &serde_json::json!({ "error": e.to_string() }))
            }
        }
    }
}

/// Handle /health endpoint
fn handle_health(backend: &str) -> ApiResponse {
    ApiResponse::json(
        200,
        &serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "store": backend
        }),
    )
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Failed to start HTTP server on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub struct EndpointServer {
    server: tiny_http::Server,
}

impl EndpointServer {
    pub fn bind(address: &str) -> Result<Self, EndpointError> {
        let server = tiny_http::Server::http(address).map_err(|source| EndpointError::Bind {
            address: address.to_string(),
            source,
        })?;
        Ok(Self { server })
    }

    /// Bound socket address; useful after binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until the listener closes, one worker per request.
    pub fn serve(self, context: Arc<ApiContext>, workers: usize) {
        let pool = ThreadPool::with_name("climate-http".to_string(), workers.max(1));

        if let Some(addr) = self.local_addr() {
            log::info!("HTTP endpoint listening on http://{}", addr);
        }
        for endpoint in AVAILABLE_ENDPOINTS {
            log::info!("   GET {}", endpoint);
        }

        for request in self.server.incoming_requests() {
            let context = Arc::clone(&context);
            pool.execute(move || respond(&context, request));
        }

        pool.join();
    }
}

fn respond(context: &ApiContext, request: Request) {
    let response = context.handle(request.method(), request.url());
    log::info!(
        "{} {} -> {}",
        request.method(),
        request.url(),
        response.status
    );

    if let Err(e) = request.respond(response.into_tiny_http()) {
        log::warn!("Failed to send response: {}", e);
    }
}

/// Bind `address` and serve until the process exits.
pub fn start_endpoint_server(
    address: &str,
    context: ApiContext,
    workers: usize,
) -> Result<(), EndpointError> {
    let server = EndpointServer::bind(address)?;
    server.serve(Arc::new(context), workers);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
