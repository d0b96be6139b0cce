//! Fragment fetching.
//!
//! # Responsibilities
//! - Define the fetch seam the composer resolves placeholders through
//! - Guard recursive descent against cyclic or runaway include graphs
//! - Fetch fragment bodies over HTTP with session headers attached
//!
//! # Design Decisions
//! - The depth guard substitutes the fallback instead of failing the branch
//! - Upstream failures are NOT handled here; fallback-on-failure is the
//!   composer's responsibility, keeping the guard a pure depth check
//! - No retries or caching; a caller may wrap the trait with either

use std::collections::HashMap;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, Uri};
use futures_util::future::BoxFuture;
use http_body_util::BodyExt;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;

use crate::composing::step::CompositionStep;
use crate::observability::metrics;
use crate::routing::route_match::expand_path_arguments;
use crate::session::SessionRoot;

/// The shared outbound HTTP client used for all backend calls.
pub type HttpClient = Client<HttpConnector, Body>;

/// Errors from the fetch layer. Any of these degrades the affected include
/// to its fallback; they never abort the surrounding composition.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid fetch target `{path}`: {reason}")]
    InvalidTarget { path: String, reason: String },

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream response is not valid utf-8: {0}")]
    Decode(String),

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
}

/// Fetch capability consumed by the composer. Object-safe so tests can stub
/// it and the recursion guard can wrap any implementation.
pub trait ContentFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        fallback: &'a str,
        step: &'a CompositionStep,
    ) -> BoxFuture<'a, Result<Response<String>, FetchError>>;
}

/// Wraps a fetcher with the recursion depth guard.
///
/// Include graphs are backend-authored and may be cyclic (A includes B
/// includes A). Once a step's depth exceeds the configured maximum the
/// fallback is returned as a successful response without any network call;
/// sibling branches are unaffected.
pub struct RecursionAwareFetcher {
    inner: Box<dyn ContentFetcher>,
    max_recursion: usize,
}

impl RecursionAwareFetcher {
    pub fn new(inner: Box<dyn ContentFetcher>, max_recursion: usize) -> Self {
        Self {
            inner,
            max_recursion,
        }
    }
}

impl ContentFetcher for RecursionAwareFetcher {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        fallback: &'a str,
        step: &'a CompositionStep,
    ) -> BoxFuture<'a, Result<Response<String>, FetchError>> {
        if step.depth() > self.max_recursion {
            tracing::warn!(
                path,
                depth = step.depth(),
                max_recursion = self.max_recursion,
                "recursion limit exceeded, substituting fallback"
            );
            metrics::record_recursion_guard_trip();
            let response = Response::new(fallback.to_string());
            return Box::pin(async move { Ok(response) });
        }
        self.inner.fetch(path, fallback, step)
    }
}

/// The concrete HTTP fetch capability.
///
/// Validates the include path, expands `{name}` placeholders from the
/// matched route's path arguments, attaches the root session's headers and
/// fetches the fragment body as UTF-8 text.
pub struct ValidatingContentFetcher {
    client: HttpClient,
    path_arguments: HashMap<String, String>,
    session: SessionRoot,
    fetch_timeout: Duration,
}

impl ValidatingContentFetcher {
    pub fn new(
        client: HttpClient,
        path_arguments: HashMap<String, String>,
        session: SessionRoot,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            client,
            path_arguments,
            session,
            fetch_timeout,
        }
    }
}

impl ContentFetcher for ValidatingContentFetcher {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        fallback: &'a str,
        step: &'a CompositionStep,
    ) -> BoxFuture<'a, Result<Response<String>, FetchError>> {
        Box::pin(async move {
            if path.trim().is_empty() {
                tracing::warn!(step = %step, "include without path, substituting fallback");
                return Ok(Response::new(fallback.to_string()));
            }
            let expanded = expand_path_arguments(path, &self.path_arguments);
            let uri: Uri = expanded
                .parse()
                .map_err(|e: axum::http::uri::InvalidUri| FetchError::InvalidTarget {
                    path: expanded.clone(),
                    reason: e.to_string(),
                })?;

            let mut builder = Request::builder().method(Method::GET).uri(uri);
            for (name, value) in self.session.as_headers() {
                builder = builder.header(name, value);
            }
            let request = builder
                .body(Body::empty())
                .map_err(|e| FetchError::InvalidTarget {
                    path: expanded.clone(),
                    reason: e.to_string(),
                })?;

            let started = std::time::Instant::now();
            let response = tokio::time::timeout(self.fetch_timeout, self.client.request(request))
                .await
                .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let (parts, body) = response.into_parts();
            let bytes = body
                .collect()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?
                .to_bytes();
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|e| FetchError::Decode(e.to_string()))?;

            metrics::record_fragment_fetch(parts.status.as_u16(), started);
            tracing::debug!(
                path = %expanded,
                status = %parts.status,
                bytes = text.len(),
                depth = step.depth(),
                "fragment fetched"
            );

            let mut out = Response::new(text);
            *out.status_mut() = parts.status;
            *out.headers_mut() = parts.headers;
            Ok(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
    }

    impl ContentFetcher for CountingFetcher {
        fn fetch<'a>(
            &'a self,
            _path: &'a str,
            _fallback: &'a str,
            _step: &'a CompositionStep,
        ) -> BoxFuture<'a, Result<Response<String>, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(Response::new("fetched".to_string())) })
        }
    }

    fn guarded(calls: Arc<AtomicUsize>, max_recursion: usize) -> RecursionAwareFetcher {
        RecursionAwareFetcher::new(Box::new(CountingFetcher { calls }), max_recursion)
    }

    #[tokio::test]
    async fn delegates_within_the_limit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = guarded(calls.clone(), 2);

        let step = CompositionStep::root("/page").child("/a").child("/b");
        assert_eq!(step.depth(), 2);

        let response = fetcher.fetch("/b", "fb", &step).await.unwrap();
        assert_eq!(response.body(), "fetched");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn substitutes_fallback_beyond_the_limit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = guarded(calls.clone(), 2);

        let step = CompositionStep::root("/page")
            .child("/a")
            .child("/b")
            .child("/c");
        assert_eq!(step.depth(), 3);

        let response = fetcher.fetch("/c", "fb", &step).await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.body(), "fb");
        assert_eq!(calls.load(Ordering::SeqCst), 0, "no network call past the guard");
    }
}
