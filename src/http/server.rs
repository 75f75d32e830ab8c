//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the SOAP endpoint
//! - Wire up middleware (tracing, timeout, request ID, body limit)
//! - Run dispatch off the async runtime
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info_span};

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, SoapResponse};
use crate::envelope::Fault;
use crate::http::request::{request_id, RequestUuid};
use crate::lifecycle::Shutdown;
use crate::service::SoapService;

/// HTTP server hosting one SOAP service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server for the given dispatcher.
    pub fn new<S: SoapService>(config: ServerConfig, dispatcher: Dispatcher<S>) -> Self {
        let router = Self::build_router(&config, dispatcher);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router<S: SoapService>(config: &ServerConfig, dispatcher: Dispatcher<S>) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(RequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        Router::new()
            .route(&config.endpoint.path, post(soap_handler::<S>))
            .with_state(dispatcher)
            .layer(DefaultBodyLimit::max(config.endpoint.max_body_bytes))
            .layer(middleware)
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.endpoint.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// SOAP endpoint handler.
/// Runs the synchronous dispatch on the blocking pool.
async fn soap_handler<S: SoapService>(
    State(dispatcher): State<Dispatcher<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> SoapResponse {
    let span = info_span!("soap_request", request_id = %request_id(&headers));

    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| dispatcher.dispatch(&headers, &body))
    })
    .await;

    match result {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Dispatch task failed");
            SoapResponse::from_fault(Fault::server("request could not be processed"))
        }
    }
}
