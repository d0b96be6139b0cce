//! Server-side HTML composition gateway.
//!
//! Assembles pages from template and fragment microservices at the edge:
//! a request is routed to a template backend, the template markup is
//! scanned for include markers, the referenced fragments are fetched
//! concurrently (recursively, with a depth guard), and the resolved
//! content is spliced back into the page before it is returned.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌────────────────────────────────────────────────┐
//!                       │               COMPOSITION GATEWAY              │
//!                       │                                                │
//!   Client Request      │  ┌─────────┐    ┌──────────────┐               │
//!   ────────────────────┼─▶│  http   │───▶│   routing    │               │
//!                       │  │ server  │    │   engine     │               │
//!                       │  └─────────┘    └──────┬───────┘               │
//!                       │                        │ template              │
//!                       │                        ▼                       │     Template /
//!                       │                ┌──────────────┐                │     Fragment
//!                       │                │  composing   │◀───────────────┼──── Backends
//!                       │                │ scan + fetch │  fragments     │
//!                       │                └──────┬───────┘                │
//!                       │                        │                       │
//!   Client Response     │  ┌─────────┐   ┌──────────────┐                │
//!   ◀───────────────────┼──│ session │◀──│   spliced    │                │
//!                       │  │ headers │   │   document   │                │
//!                       │  └─────────┘   └──────────────┘                │
//!                       │                                                │
//!                       │  ┌──────────────────────────────────────────┐  │
//!                       │  │          Cross-Cutting Concerns          │  │
//!                       │  │   config     observability     session   │  │
//!                       │  └──────────────────────────────────────────┘  │
//!                       └────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod composing;
pub mod config;
pub mod http;
pub mod routing;
pub mod session;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
