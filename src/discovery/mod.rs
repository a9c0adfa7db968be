//! Service discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Startup / schedule tick / failed connect
//!     → service.rs (refresh with deadline)
//!     → resolver.rs (run lookup, collect output lines)
//!     → records.rs (keep lines for the service, pick host field)
//!     → BackendRegistry::replace (always, even with an empty list)
//! ```
//!
//! # Design Decisions
//! - Timeouts and empty answers are warnings, never errors to the caller
//! - A query past its deadline is dropped, and with it the lookup process
//! - Stopping the schedule does not interrupt a refresh in flight

pub mod records;
pub mod resolver;
pub mod service;

pub use resolver::{DigResolver, NameResolver, StaticResolver};
pub use service::{DiscoveryError, DiscoveryService, Refresh};
