//! Accumulated session state for one request.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Response};

use crate::session::fragment::SessionFragment;

/// Header prefix under which session entries travel on the wire.
pub const SESSION_HEADER_PREFIX: &str = "x-session-";

/// Serializes session data onto an outgoing response.
///
/// Implemented by [`SessionHandler`](crate::session::SessionHandler); a no-op
/// implementation exists for deployments without sessions.
pub trait Serializer {
    fn write_to<T>(
        &self,
        response: Response<T>,
        session_data: &BTreeMap<String, String>,
        dirty: bool,
    ) -> Response<T>;
}

/// The session accumulated across a whole composition.
///
/// Created once per request, either empty or from the inbound request's
/// prefixed headers. Mutated only by [`SessionRoot::merged_with`], which
/// returns a new instance; the root is serialized onto the response exactly
/// once, when the final response is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRoot {
    data: BTreeMap<String, String>,
    dirty: bool,
}

impl SessionRoot {
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
            dirty: false,
        }
    }

    /// Builds the root from the inbound request's prefixed session headers.
    pub fn of_request(headers: &HeaderMap) -> Self {
        Self {
            data: SessionFragment::from_headers(headers).data().clone(),
            dirty: false,
        }
    }

    /// Merges a fragment into this root, producing a new root. Fragment
    /// entries win on key collision; existing keys are never removed. The
    /// result is dirty if this root was dirty or the merge changed anything.
    pub fn merged_with(&self, fragment: &SessionFragment) -> SessionRoot {
        let mut data = self.data.clone();
        let mut changed = false;
        for (key, value) in fragment.data() {
            let previous = data.insert(key.clone(), value.clone());
            changed |= previous.as_deref() != Some(value.as_str());
        }
        SessionRoot {
            data,
            dirty: self.dirty || changed,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The session in wire form, one prefixed header per entry. Entries that
    /// do not form valid header names or values are skipped.
    pub fn as_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        self.data
            .iter()
            .filter_map(|(key, value)| {
                let name = HeaderName::try_from(format!("{SESSION_HEADER_PREFIX}{key}")).ok()?;
                let value = HeaderValue::try_from(value.as_str()).ok()?;
                Some((name, value))
            })
            .collect()
    }

    pub fn serialized_with<T, S: Serializer>(&self, response: Response<T>, serializer: &S) -> Response<T> {
        serializer.write_to(response, &self.data, self.dirty)
    }
}
