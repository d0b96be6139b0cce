//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::route_match::RouteType;

/// Root configuration for the composition gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping requests to backend templates.
    pub routes: Vec<RouteConfig>,

    /// Composition settings (recursion limit, marker tag names).
    pub composition: CompositionConfig,

    /// Session handling settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route configuration mapping a request pattern to a backend template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// HTTP method to match; absent matches any method.
    #[serde(default)]
    pub method: Option<String>,

    /// Path pattern with `{name}` captures, e.g. "/products/{id}".
    pub path_pattern: String,

    /// Backend URL template; captures may be referenced, e.g.
    /// "http://catalog:8081/products/{id}".
    pub backend: String,

    /// How the backend response is treated.
    #[serde(rename = "type", default = "default_route_type")]
    pub route_type: RouteType,
}

fn default_route_type() -> RouteType {
    RouteType::Template
}

/// Composition settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Maximum include recursion depth. The sole guard against cyclic
    /// include graphs.
    pub max_recursion: usize,

    /// Tag name of include markers.
    pub include_tag: String,

    /// Tag name of content markers.
    pub content_tag: String,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            max_recursion: 3,
            include_tag: "fragment-include".to_string(),
            content_tag: "fragment-content".to_string(),
        }
    }
}

/// Session handling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Enable header-based session handling. Disabled deployments run with
    /// the no-op handler.
    pub enabled: bool,

    /// Ordered interceptor names run after session initialization.
    pub interceptors: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interceptors: Vec::new(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,

    /// Per-fragment fetch timeout in seconds.
    pub fetch_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            fetch_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
