//! Matchit routing configuration.

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;

use crate::handlers;
use evaluacion_core::config::StoreConfig;
use evaluacion_core::persistence::PersistenceManager;
use evaluacion_core::EvaluacionStore;

/// Base path of the Evaluacion resource.
pub const EVALUACIONS_PATH: &str = "/api/evaluacions";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Record store
    pub store: Arc<EvaluacionStore>,
    /// Snapshot writer for the store
    pub persistence: Arc<PersistenceManager>,
    /// Service configuration
    pub config: Arc<StoreConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with the Evaluacion routes.
    pub fn new(
        store: Arc<EvaluacionStore>,
        persistence: Arc<PersistenceManager>,
        config: Arc<StoreConfig>,
    ) -> Self {
        let mut router = MatchitRouter::new();

        router
            .insert(EVALUACIONS_PATH, RouteHandler::Collection)
            .expect("Failed to insert /api/evaluacions route");
        router
            .insert(format!("{}/{{id}}", EVALUACIONS_PATH), RouteHandler::Item)
            .expect("Failed to insert /api/evaluacions/{id} route");

        Self {
            inner: router,
            state: AppState {
                store,
                persistence,
                config,
            },
        }
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// Generic over the body so tests can drive the router with in-memory
    /// bodies instead of a socket.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let path = req.uri().path().to_string();

        let (handler, id) = match self.inner.at(&path) {
            Ok(matched) => (*matched.value, matched.params.get("id").map(str::to_string)),
            Err(_) => {
                // Return 404 for unmatched routes
                let error_response = handlers::error_response(
                    404,
                    "Not Found".to_string(),
                    Some(format!("No route found for {}", path)),
                );
                let body = serde_json::to_vec(&error_response).map_err(|e| {
                    RouterError::InternalError(format!("Failed to serialize error response: {}", e))
                })?;
                return handlers::build_response(404, body);
            }
        };

        handler.handle(req, id, self.state.clone()).await
    }
}

/// Route handler function.
#[derive(Debug, Clone, Copy)]
enum RouteHandler {
    Collection,
    Item,
}

impl RouteHandler {
    /// Dispatches on the HTTP method.
    async fn handle<B>(
        self,
        req: Request<B>,
        id: Option<String>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        match (self, id) {
            (RouteHandler::Collection, _) => {
                if method == Method::POST {
                    handlers::create_evaluacion(req, state).await
                } else if method == Method::PUT {
                    handlers::update_evaluacion(req, state).await
                } else if method == Method::GET {
                    handlers::get_all_evaluacions(req, state).await
                } else {
                    Err(RouterError::MethodNotAllowed)
                }
            }
            (RouteHandler::Item, Some(id)) => {
                if method == Method::GET {
                    handlers::get_evaluacion(&id, state).await
                } else if method == Method::DELETE {
                    handlers::delete_evaluacion(&id, state).await
                } else {
                    Err(RouterError::MethodNotAllowed)
                }
            }
            (RouteHandler::Item, None) => Err(RouterError::InternalError(
                "Route matched without id parameter".to_string(),
            )),
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let (status, message) = match &err {
            RouterError::MethodNotAllowed => (405, "Method Not Allowed"),
            RouterError::InternalError(msg) => (500, msg.as_str()),
            RouterError::Timeout => (408, "Request Timeout"),
            RouterError::BadRequest(msg) => (400, msg.as_str()),
            RouterError::NotFound(msg) => (404, msg.as_str()),
        };

        let error_response = handlers::error_response(status, message.to_string(), None);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\",\"details\":null}}}}", e).into_bytes());

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from("Internal Server Error"));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}
