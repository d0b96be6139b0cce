//! Session lifecycle handling.
//!
//! # Responsibilities
//! - Initialize a `SessionRoot` from the inbound request
//! - Run the configured interceptor chain after initialization
//! - Serialize the merged session onto the outgoing response
//!
//! # Design Decisions
//! - Interceptors are an explicit ordered list selected by name from
//!   configuration at startup; there is no runtime discovery
//! - Interceptor failures propagate and fail the whole request, unlike
//!   fragment fetch failures which degrade to fallbacks
//! - Session headers are only written back when the session is dirty

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Response};
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::session::fragment::SessionFragment;
use crate::session::response::ResponseWithSession;
use crate::session::root::{Serializer, SessionRoot};

/// Errors raised during session initialization. These fail the request.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session interceptor `{name}` failed: {reason}")]
    Interceptor { name: String, reason: String },

    #[error("unknown session interceptor `{0}` in configuration")]
    UnknownInterceptor(String),
}

/// Runs after a session is initialized and may modify it before the request
/// is processed.
pub trait SessionInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn after_creation<'a>(
        &'a self,
        session: SessionRoot,
        request_headers: &'a HeaderMap,
    ) -> BoxFuture<'a, Result<SessionRoot, SessionError>>;
}

/// Assigns a `session-id` entry when the inbound session carries none.
pub struct SessionIdInterceptor;

impl SessionInterceptor for SessionIdInterceptor {
    fn name(&self) -> &'static str {
        "session-id"
    }

    fn after_creation<'a>(
        &'a self,
        session: SessionRoot,
        _request_headers: &'a HeaderMap,
    ) -> BoxFuture<'a, Result<SessionRoot, SessionError>> {
        Box::pin(async move {
            if session.get("session-id").is_some() {
                return Ok(session);
            }
            let id = uuid::Uuid::new_v4().to_string();
            Ok(session.merged_with(&SessionFragment::of([("session-id", id)])))
        })
    }
}

/// Handles the session lifecycle around a single request.
pub struct SessionHandler {
    enabled: bool,
    interceptors: Vec<Box<dyn SessionInterceptor>>,
}

impl SessionHandler {
    /// A handler for deployments without sessions: initialization yields an
    /// empty root and nothing is ever written back.
    pub fn no_session() -> Self {
        Self {
            enabled: false,
            interceptors: Vec::new(),
        }
    }

    pub fn header_based(interceptors: Vec<Box<dyn SessionInterceptor>>) -> Self {
        Self {
            enabled: true,
            interceptors,
        }
    }

    /// Builds the handler from configuration, resolving interceptor names
    /// against the known implementations.
    pub fn from_config(config: &crate::config::schema::SessionConfig) -> Result<Self, SessionError> {
        if !config.enabled {
            return Ok(Self::no_session());
        }
        let mut interceptors: Vec<Box<dyn SessionInterceptor>> = Vec::new();
        for name in &config.interceptors {
            match name.as_str() {
                "session-id" => interceptors.push(Box::new(SessionIdInterceptor)),
                unknown => return Err(SessionError::UnknownInterceptor(unknown.to_string())),
            }
        }
        Ok(Self::header_based(interceptors))
    }

    /// Obtains the session for a request and runs the interceptor chain in
    /// configured order. The first failing interceptor aborts the chain.
    pub async fn initialize(&self, request_headers: &HeaderMap) -> Result<SessionRoot, SessionError> {
        let mut session = if self.enabled {
            SessionRoot::of_request(request_headers)
        } else {
            SessionRoot::empty()
        };
        for interceptor in &self.interceptors {
            session = interceptor.after_creation(session, request_headers).await?;
        }
        Ok(session)
    }

    /// Serializes the accumulated session onto the outgoing response. This is
    /// the single point where session state leaves the process.
    pub fn store<T>(&self, response: ResponseWithSession<T>) -> Response<T> {
        response.write_session_to_response(self)
    }
}

impl Serializer for SessionHandler {
    fn write_to<T>(
        &self,
        mut response: Response<T>,
        session_data: &BTreeMap<String, String>,
        dirty: bool,
    ) -> Response<T> {
        if !self.enabled || !dirty {
            return response;
        }
        for (name, value) in SessionRoot::of(session_data.clone()).as_headers() {
            response.headers_mut().insert(name, value);
        }
        response
    }
}
