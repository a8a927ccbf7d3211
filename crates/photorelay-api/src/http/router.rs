//! Router construction and server host.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use photorelay_telemetry::{
    RecordResponse, RequestSpan, propagate_request_id_layer, set_request_id_layer,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::health::{health, metrics};
use crate::http::photos::list_photos;
use crate::http::scope::request_scope;
use crate::http::status::status_page;
use crate::http::upload::upload;
use crate::state::ApiState;

/// Axum-powered HTTP host for the relay.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Build the router with tracing, request-id and body-limit layers.
    #[must_use]
    pub fn new(state: ApiState) -> Self {
        let body_limit = state.max_upload_bytes;
        let layered = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(RequestSpan)
                    .on_response(RecordResponse),
            )
            .layer(propagate_request_id_layer())
            .layer(middleware::from_fn(request_scope));

        let router = Router::new()
            .route("/", get(status_page))
            .route("/upload", post(upload))
            .route("/health", get(health))
            .route("/list", get(list_photos))
            .route("/metrics", get(metrics))
            .route_layer(layered)
            .layer(DefaultBodyLimit::max(body_limit))
            .with_state(Arc::new(state));

        Self { router }
    }

    /// Router handle, for serving or driving requests directly.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the HTTP listener for `addr`.
    ///
    /// # Errors
    ///
    /// Returns `Bind` if the address is unavailable.
    pub async fn bind(addr: SocketAddr) -> ApiServerResult<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns `Serve` if the server fails.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ApiServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|source| ApiServerError::Serve { source })?;
        info!(addr = %local_addr, "http surface listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }
}
