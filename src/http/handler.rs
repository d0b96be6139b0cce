//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the route for an inbound request
//! - Fetch the template with session headers attached
//! - Decide proxy-vs-compose and produce the final response
//!
//! # State machine per request
//! ```text
//! ROUTING → (NOT_FOUND | FETCHING_TEMPLATE)
//!         → (DEFAULT | PROXY_PASSTHROUGH | COMPOSING)
//!         → DONE
//! ```
//! No state is revisited.
//!
//! # Design Decisions
//! - Route miss and top-level upstream failures yield a fixed,
//!   low-information default response; nothing internal leaks to the client
//! - Session interceptor failures fail the whole request (fail-fast)
//! - Backend response headers are copied onto the composed result with
//!   first-value-wins; replacing this with an explicit allow-list is a
//!   pending policy decision, not a bug

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, Response, StatusCode};

use crate::composing::composer::ComposerFactory;
use crate::routing::client::TemplateClient;
use crate::routing::router::BackendRouting;
use crate::session::{ResponseWithSession, SessionHandler};

/// Dispatches one request through routing, template fetch and composition.
pub struct ComposingRequestHandler {
    routing: Arc<BackendRouting>,
    template_client: Arc<dyn TemplateClient>,
    composer_factory: Arc<dyn ComposerFactory>,
    session_handler: Arc<SessionHandler>,
}

impl ComposingRequestHandler {
    pub fn new(
        routing: Arc<BackendRouting>,
        template_client: Arc<dyn TemplateClient>,
        composer_factory: Arc<dyn ComposerFactory>,
        session_handler: Arc<SessionHandler>,
    ) -> Self {
        Self {
            routing,
            template_client,
            composer_factory,
            session_handler,
        }
    }

    /// The sole entry point for dispatch.
    pub async fn execute(&self, request: Request<Body>) -> Response<String> {
        let (parts, _body) = request.into_parts();

        let session = match self.session_handler.initialize(&parts.headers).await {
            Ok(session) => session,
            Err(error) => {
                tracing::error!(error = %error, "session initialization failed");
                return fixed_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error");
            }
        };

        let Some(route) = self.routing.matches(&parts) else {
            tracing::debug!(path = %parts.uri.path(), "no route matched");
            return default_response();
        };
        tracing::info!(
            path = %parts.uri.path(),
            backend = %route.backend(),
            route_type = ?route.route_type(),
            "route matched"
        );

        let fetched = match self.template_client.fetch(&route, &parts, &session).await {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!(backend = %route.backend(), error = %error, "template fetch failed");
                return default_response();
            }
        };
        let (template, session) = fetched.into_parts();

        if !template.status().is_success() || template.body().is_empty() {
            tracing::warn!(
                backend = %route.backend(),
                status = %template.status(),
                "template unusable"
            );
            return default_response();
        }

        if route.should_proxy() {
            let (parts, payload) = template.into_parts();
            let mut response = Response::new(payload);
            *response.status_mut() = parts.status;
            copy_backend_headers(&parts.headers, response.headers_mut());
            return self
                .session_handler
                .store(ResponseWithSession::new(response, session));
        }

        let backend_headers = template.headers().clone();
        let composer = self
            .composer_factory
            .build(route.path_arguments().clone(), session);
        let composed = composer
            .compose_template(template, &route.expanded_path())
            .await;

        let (mut response, session) = composed.into_parts();
        copy_backend_headers(&backend_headers, response.headers_mut());
        self.session_handler
            .store(ResponseWithSession::new(response, session))
    }
}

/// The fixed response for route misses and top-level upstream failures.
fn default_response() -> Response<String> {
    fixed_response(StatusCode::NOT_FOUND, "no matching route")
}

fn fixed_response(status: StatusCode, body: &str) -> Response<String> {
    let mut response = Response::new(body.to_string());
    *response.status_mut() = status;
    response
}

/// Copies backend response headers onto the composed result, first value
/// wins on conflict. Framing headers are skipped since the composed body
/// differs from the backend's.
fn copy_backend_headers(from: &HeaderMap, into: &mut HeaderMap) {
    for (name, value) in from {
        if name == header::CONTENT_LENGTH
            || name == header::TRANSFER_ENCODING
            || name == header::CONNECTION
        {
            continue;
        }
        if !into.contains_key(name) {
            into.insert(name.clone(), value.clone());
        }
    }
}
