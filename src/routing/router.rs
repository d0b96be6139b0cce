//! Route lookup.
//!
//! # Responsibilities
//! - Compile route configurations into a matchable table at startup
//! - Resolve an inbound request to a `RouteMatch`, capturing path arguments
//!
//! # Design Decisions
//! - Patterns are segment-wise: literals match exactly, `{name}` captures
//!   one segment; no regex in the hot path
//! - Method matching is optional per route (absent = any method)
//! - Deterministic: first route in declaration order wins

use std::collections::HashMap;

use axum::http::request::Parts;
use axum::http::Method;

use crate::config::schema::RouteConfig;
use crate::routing::route_match::{RouteMatch, RouteType};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    name: String,
    method: Option<Method>,
    segments: Vec<Segment>,
    backend: String,
    route_type: RouteType,
}

/// The immutable, process-wide route table.
#[derive(Debug, Clone, Default)]
pub struct BackendRouting {
    routes: Vec<CompiledRoute>,
}

impl BackendRouting {
    /// Compiles the configured routes. Routes with an unparseable method are
    /// skipped with a warning; config validation reports them upfront.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let routes = routes
            .iter()
            .filter_map(|route| {
                let method = match &route.method {
                    Some(m) => match m.parse::<Method>() {
                        Ok(method) => Some(method),
                        Err(_) => {
                            tracing::warn!(route = %route.name, method = %m, "invalid method, skipping route");
                            return None;
                        }
                    },
                    None => None,
                };
                Some(CompiledRoute {
                    name: route.name.clone(),
                    method,
                    segments: compile_pattern(&route.path_pattern),
                    backend: route.backend.clone(),
                    route_type: route.route_type,
                })
            })
            .collect();
        Self { routes }
    }

    /// Resolves the first matching route for a request, or `None`.
    pub fn matches(&self, request: &Parts) -> Option<RouteMatch> {
        let path = request.uri.path();
        for route in &self.routes {
            if let Some(required) = &route.method {
                if required != request.method {
                    continue;
                }
            }
            if let Some(arguments) = match_path(&route.segments, path) {
                tracing::debug!(route = %route.name, path, "route matched");
                return Some(RouteMatch::new(
                    route.backend.clone(),
                    route.route_type,
                    arguments,
                ));
            }
        }
        None
    }
}

fn compile_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(|name| Segment::Capture(name.to_string()))
                .unwrap_or_else(|| Segment::Literal(segment.to_string()))
        })
        .collect()
}

fn match_path(segments: &[Segment], path: &str) -> Option<HashMap<String, String>> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() != segments.len() {
        return None;
    }
    let mut arguments = HashMap::new();
    for (segment, part) in segments.iter().zip(parts) {
        match segment {
            Segment::Literal(literal) => {
                if literal != part {
                    return None;
                }
            }
            Segment::Capture(name) => {
                arguments.insert(name.clone(), part.to_string());
            }
        }
    }
    Some(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn route(name: &str, method: Option<&str>, pattern: &str, backend: &str, route_type: RouteType) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            method: method.map(str::to_string),
            path_pattern: pattern.to_string(),
            backend: backend.to_string(),
            route_type,
        }
    }

    fn parts(method: Method, uri: &str) -> Parts {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn literal_match_with_capture() {
        let routing = BackendRouting::from_config(&[route(
            "product",
            Some("GET"),
            "/products/{id}",
            "http://catalog/products/{id}",
            RouteType::Template,
        )]);

        let matched = routing.matches(&parts(Method::GET, "/products/42")).unwrap();
        assert_eq!(matched.path_arguments().get("id").unwrap(), "42");
        assert_eq!(matched.expanded_path(), "http://catalog/products/42");
    }

    #[test]
    fn method_mismatch_does_not_match() {
        let routing = BackendRouting::from_config(&[route(
            "product",
            Some("GET"),
            "/products/{id}",
            "http://catalog",
            RouteType::Template,
        )]);
        assert!(routing.matches(&parts(Method::POST, "/products/42")).is_none());
    }

    #[test]
    fn any_method_route_matches_all_methods() {
        let routing = BackendRouting::from_config(&[route(
            "all",
            None,
            "/page",
            "http://backend",
            RouteType::Template,
        )]);
        assert!(routing.matches(&parts(Method::GET, "/page")).is_some());
        assert!(routing.matches(&parts(Method::POST, "/page")).is_some());
    }

    #[test]
    fn first_declared_route_wins() {
        let routing = BackendRouting::from_config(&[
            route("first", None, "/page", "http://one", RouteType::Template),
            route("second", None, "/page", "http://two", RouteType::Proxy),
        ]);
        let matched = routing.matches(&parts(Method::GET, "/page")).unwrap();
        assert_eq!(matched.backend(), "http://one");
    }

    #[test]
    fn segment_count_must_match() {
        let routing = BackendRouting::from_config(&[route(
            "page",
            None,
            "/a/{x}",
            "http://backend",
            RouteType::Template,
        )]);
        assert!(routing.matches(&parts(Method::GET, "/a")).is_none());
        assert!(routing.matches(&parts(Method::GET, "/a/b/c")).is_none());
    }

    #[test]
    fn no_routes_means_no_match() {
        let routing = BackendRouting::from_config(&[]);
        assert!(routing.matches(&parts(Method::GET, "/anything")).is_none());
    }
}
