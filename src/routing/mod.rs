//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path)
//!     → router.rs (compiled route table, first match wins)
//!     → RouteMatch { backend, route type, path arguments }
//!     → client.rs (session-aware template fetch)
//!
//! Route compilation (at startup):
//!     RouteConfig[]
//!     → split path patterns into literal / capture segments
//!     → freeze as immutable BackendRouting
//! ```
//!
//! # Design Decisions
//! - Routes compiled once at startup, immutable at runtime
//! - No regex; plain segment comparison with `{name}` captures
//! - First match wins in declaration order
//! - Explicit `None` on no match rather than a silent default

pub mod client;
pub mod route_match;
pub mod router;

pub use client::{SessionAwareClient, TemplateClient};
pub use route_match::{RouteMatch, RouteType};
pub use router::BackendRouting;
