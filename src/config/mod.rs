//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (binary only)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → sections handed to each subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    BackendConfig, DiscoveryConfig, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig,
    RelayConfig, DEFAULT_MAX_CONNECT_ATTEMPTS, DEFAULT_MAX_REGISTRY_WRAPS,
};
