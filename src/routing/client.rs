//! Session-aware template fetching.

use std::time::Duration;

use axum::body::Body;
use axum::http::{request::Parts, Request, Response, Uri};
use futures_util::future::BoxFuture;
use http_body_util::BodyExt;

use crate::composing::fetcher::{FetchError, HttpClient};
use crate::routing::route_match::RouteMatch;
use crate::session::{ResponseWithSession, SessionFragment, SessionRoot};

/// Fetches the template document for a matched route. A trait so dispatch
/// tests can stub the backend away.
pub trait TemplateClient: Send + Sync {
    fn fetch<'a>(
        &'a self,
        route: &'a RouteMatch,
        request: &'a Parts,
        session: &'a SessionRoot,
    ) -> BoxFuture<'a, Result<ResponseWithSession<String>, FetchError>>;
}

/// HTTP template client that attaches the inbound session's serialized
/// headers to the outbound call and merges the session fragment parsed from
/// the response headers into the returned session.
pub struct SessionAwareClient {
    client: HttpClient,
    fetch_timeout: Duration,
}

impl SessionAwareClient {
    pub fn new(client: HttpClient, fetch_timeout: Duration) -> Self {
        Self {
            client,
            fetch_timeout,
        }
    }
}

impl TemplateClient for SessionAwareClient {
    fn fetch<'a>(
        &'a self,
        route: &'a RouteMatch,
        request: &'a Parts,
        session: &'a SessionRoot,
    ) -> BoxFuture<'a, Result<ResponseWithSession<String>, FetchError>> {
        Box::pin(async move {
            let target = route.expanded_path();
            let uri: Uri = target
                .parse()
                .map_err(|e: axum::http::uri::InvalidUri| FetchError::InvalidTarget {
                    path: target.clone(),
                    reason: e.to_string(),
                })?;

            let mut builder = Request::builder().method(request.method.clone()).uri(uri);
            for (name, value) in session.as_headers() {
                builder = builder.header(name, value);
            }
            let outbound = builder
                .body(Body::empty())
                .map_err(|e| FetchError::InvalidTarget {
                    path: target.clone(),
                    reason: e.to_string(),
                })?;

            let response = tokio::time::timeout(self.fetch_timeout, self.client.request(outbound))
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

            tracing::debug!(
                target = %target,
                status = %parts.status,
                bytes = text.len(),
                "template fetched"
            );

            let fragment = SessionFragment::from_headers(&parts.headers);
            let mut template = Response::new(text);
            *template.status_mut() = parts.status;
            *template.headers_mut() = parts.headers;

            Ok(ResponseWithSession::new(
                template,
                session.merged_with(&fragment),
            ))
        })
    }
}
