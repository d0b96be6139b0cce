//! Configuration subsystem.
//!
//! # Responsibilities
//! - Define the configuration schema (schema.rs)
//! - Load and parse TOML config files (loader.rs)
//! - Validate semantic constraints before startup (validation.rs)
//!
//! # Design Decisions
//! - Configuration is read once at startup and immutable afterwards
//! - Every section has sensible defaults; an empty file is a valid config
//! - Validation reports all errors at once, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
