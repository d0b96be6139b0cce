//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum router with the catch-all composition handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Build the shared outbound HTTP client and dispatch handler
//! - Bind the server to a listener and serve until shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::composing::composer::HtmlComposerFactory;
use crate::config::schema::GatewayConfig;
use crate::http::handler::ComposingRequestHandler;
use crate::observability::metrics;
use crate::routing::client::SessionAwareClient;
use crate::routing::router::BackendRouting;
use crate::session::{SessionError, SessionHandler};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<ComposingRequestHandler>,
}

/// HTTP server for the composition gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, SessionError> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let fetch_timeout = Duration::from_secs(config.timeouts.fetch_secs);

        let routing = Arc::new(BackendRouting::from_config(&config.routes));
        let session_handler = Arc::new(SessionHandler::from_config(&config.session)?);
        let template_client = Arc::new(SessionAwareClient::new(client.clone(), fetch_timeout));
        let composer_factory = Arc::new(HtmlComposerFactory::from_config(
            &config.composition,
            fetch_timeout,
            client,
        ));

        let handler = Arc::new(ComposingRequestHandler::new(
            routing,
            template_client,
            composer_factory,
            session_handler,
        ));

        let router = Self::build_router(&config, AppState { handler });
        Ok(Self { router, config })
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(compose_handler))
            .route("/", any(compose_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Catch-all handler: every request goes through dispatch.
async fn compose_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> impl IntoResponse {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = state.handler.execute(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);

    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::from(body))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
