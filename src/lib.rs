//! Dynamic TCP reverse proxy.
//!
//! Accepts client connections, learns the current backends of a named
//! service from a name-resolution service, picks one round-robin with
//! failover, and relays bytes both ways until the exchange completes.

pub mod config;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod resilience;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use lifecycle::Shutdown;
pub use proxy::ProxyServer;
