//! Pairing of a response payload with accumulated session state.

use axum::http::Response;

use crate::session::root::{Serializer, SessionRoot};

/// A response plus the [`SessionRoot`] accumulated up to this point.
///
/// Threads session state through recursive composition without any shared
/// mutable global; every fetch boundary hands a new instance down or up.
#[derive(Debug)]
pub struct ResponseWithSession<T> {
    response: Response<T>,
    session: SessionRoot,
}

impl<T> ResponseWithSession<T> {
    pub fn new(response: Response<T>, session: SessionRoot) -> Self {
        Self { response, session }
    }

    pub fn response(&self) -> &Response<T> {
        &self.response
    }

    pub fn session(&self) -> &SessionRoot {
        &self.session
    }

    pub fn into_parts(self) -> (Response<T>, SessionRoot) {
        (self.response, self.session)
    }

    /// Transforms the payload while carrying the session along.
    pub fn map_payload<U, F: FnOnce(T) -> U>(self, f: F) -> ResponseWithSession<U> {
        ResponseWithSession {
            response: self.response.map(f),
            session: self.session,
        }
    }

    /// Serializes the session onto the response, consuming both.
    pub fn write_session_to_response<S: Serializer>(self, serializer: &S) -> Response<T> {
        let ResponseWithSession { response, session } = self;
        session.serialized_with(response, serializer)
    }
}
