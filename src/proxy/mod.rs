//! Proxy subsystem: accept loop and per-connection handling.
//!
//! # Data Flow
//! ```text
//! Listener::accept
//!     → spawn connection task
//!     → BackendSelector::select  (none → DiscoveryService::refresh)
//!     → connect with timeout     (fail → DiscoveryService::refresh)
//!     → ConnectionRelay::run     (both directions)
//!     → sockets dropped, permit and tracker guard released
//! ```

pub mod server;

pub use server::{BackendConnection, ProxyServer};
