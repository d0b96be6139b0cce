//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers (x-session-*)
//!     → SessionRoot (accumulated state for the whole request)
//!     → interceptor chain (handler.rs)
//!     → merged with one SessionFragment per backend response
//!     → serialized back onto the outgoing response (handler.rs)
//! ```
//!
//! # Design Decisions
//! - Session values are never mutated in place; merging produces a new root
//! - Merge is last-writer-wins per key and never removes existing keys
//! - Session state lives only in per-request header round-trips, no storage
//! - Interceptor failures fail the whole request; fetch failures never do

pub mod fragment;
pub mod handler;
pub mod response;
pub mod root;

pub use fragment::SessionFragment;
pub use handler::{SessionError, SessionHandler, SessionInterceptor};
pub use response::ResponseWithSession;
pub use root::{SessionRoot, Serializer, SESSION_HEADER_PREFIX};
