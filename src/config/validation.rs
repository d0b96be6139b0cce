//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check routes reference well-formed backends and patterns
//! - Validate value ranges (timeouts and recursion limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("route `{route}` has invalid method `{method}`")]
    InvalidMethod { route: String, method: String },

    #[error("route `{route}` path pattern `{pattern}` must start with '/'")]
    InvalidPathPattern { route: String, pattern: String },

    #[error("route `{route}` backend `{backend}` is not a valid URL: {reason}")]
    InvalidBackend {
        route: String,
        backend: String,
        reason: String,
    },

    #[error("duplicate route name `{0}`")]
    DuplicateRouteName(String),

    #[error("composition.max_recursion must be greater than zero")]
    ZeroMaxRecursion,

    #[error("composition tag name `{0}` must not be empty or contain markup delimiters")]
    InvalidTagName(String),

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("unknown session interceptor `{0}`")]
    UnknownSessionInterceptor(String),
}

const KNOWN_INTERCEPTORS: &[&str] = &["session-id"];

/// Validates the full configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut seen_names = HashSet::new();
    for route in &config.routes {
        if !seen_names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }
        if let Some(method) = &route.method {
            if method.parse::<Method>().is_err() {
                errors.push(ValidationError::InvalidMethod {
                    route: route.name.clone(),
                    method: method.clone(),
                });
            }
        }
        if !route.path_pattern.starts_with('/') {
            errors.push(ValidationError::InvalidPathPattern {
                route: route.name.clone(),
                pattern: route.path_pattern.clone(),
            });
        }
        // validate the backend with placeholders substituted out, so
        // "http://x/{id}" style templates pass
        let probe = route.backend.replace('{', "").replace('}', "");
        if let Err(e) = Url::parse(&probe) {
            errors.push(ValidationError::InvalidBackend {
                route: route.name.clone(),
                backend: route.backend.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.composition.max_recursion == 0 {
        errors.push(ValidationError::ZeroMaxRecursion);
    }
    for tag in [&config.composition.include_tag, &config.composition.content_tag] {
        if tag.is_empty() || tag.contains(['<', '>', '/', ' ']) {
            errors.push(ValidationError::InvalidTagName(tag.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.fetch_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("fetch_secs"));
    }

    for interceptor in &config.session.interceptors {
        if !KNOWN_INTERCEPTORS.contains(&interceptor.as_str()) {
            errors.push(ValidationError::UnknownSessionInterceptor(
                interceptor.clone(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
