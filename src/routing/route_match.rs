//! A resolved route: where to fetch the template and how to treat it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How the response for a matched route is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    /// Fetch and compose the backend document as a full page.
    Template,
    /// Fetch and compose, extracting the framed content region.
    Content,
    /// Pass the backend payload through verbatim, skipping composition.
    Proxy,
}

/// The result of route resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    backend: String,
    route_type: RouteType,
    path_arguments: HashMap<String, String>,
}

impl RouteMatch {
    pub fn new(
        backend: impl Into<String>,
        route_type: RouteType,
        path_arguments: HashMap<String, String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            route_type,
            path_arguments,
        }
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn route_type(&self) -> RouteType {
        self.route_type
    }

    /// True exactly when the route bypasses composition.
    pub fn should_proxy(&self) -> bool {
        self.route_type == RouteType::Proxy
    }

    pub fn path_arguments(&self) -> &HashMap<String, String> {
        &self.path_arguments
    }

    /// The backend target with `{name}` placeholders expanded from the
    /// captured path arguments.
    pub fn expanded_path(&self) -> String {
        expand_path_arguments(&self.backend, &self.path_arguments)
    }
}

/// Replaces every `{name}` occurrence in `path` with the corresponding
/// argument value. Unknown placeholders are left untouched.
pub fn expand_path_arguments(path: &str, arguments: &HashMap<String, String>) -> String {
    let mut expanded = path.to_string();
    for (name, value) in arguments {
        expanded = expanded.replace(&format!("{{{name}}}"), value);
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_detection() {
        let proxy = RouteMatch::new("http://b", RouteType::Proxy, HashMap::new());
        let template = RouteMatch::new("http://b", RouteType::Template, HashMap::new());
        assert!(proxy.should_proxy());
        assert!(!template.should_proxy());
    }

    #[test]
    fn path_argument_expansion() {
        let arguments = HashMap::from([("id".to_string(), "42".to_string())]);
        let matched = RouteMatch::new("http://products/{id}/detail", RouteType::Template, arguments);
        assert_eq!(matched.expanded_path(), "http://products/42/detail");
    }

    #[test]
    fn unknown_placeholders_are_preserved() {
        assert_eq!(
            expand_path_arguments("http://b/{missing}", &HashMap::new()),
            "http://b/{missing}"
        );
    }
}
