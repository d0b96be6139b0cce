//! HTTP layer: request dispatch and server wiring.

pub mod handler;
pub mod server;

pub use handler::ComposingRequestHandler;
pub use server::HttpServer;
