//! Per-response session snapshots.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, Response};

use crate::session::root::SESSION_HEADER_PREFIX;

/// An immutable key/value snapshot extracted from a single backend response.
///
/// One fragment is produced per backend call; fragments are merged into the
/// request's [`SessionRoot`](crate::session::SessionRoot) as composition
/// proceeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFragment {
    data: BTreeMap<String, String>,
}

impl SessionFragment {
    /// A fragment carrying no session data.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            data: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Extracts the fragment from prefixed headers. Header names arrive
    /// lowercased from the http crate; the session prefix is stripped so
    /// `x-session-user-id: 42` yields the entry `user-id = 42`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let data = headers
            .iter()
            .filter_map(|(name, value)| {
                let key = name.as_str().strip_prefix(SESSION_HEADER_PREFIX)?;
                let value = value.to_str().ok()?;
                Some((key.to_string(), value.to_string()))
            })
            .collect();
        Self { data }
    }

    pub fn from_response<T>(response: &Response<T>) -> Self {
        Self::from_headers(response.headers())
    }

    /// Merges two fragments; entries from `other` win on key collision.
    pub fn merged_with(&self, other: &SessionFragment) -> SessionFragment {
        let mut data = self.data.clone();
        for (key, value) in &other.data {
            data.insert(key.clone(), value.clone());
        }
        SessionFragment { data }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
