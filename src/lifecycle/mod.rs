//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Metrics → Bind → Discovery → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Stop discovery → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Bind failure is fatal; nothing else at runtime is
//! - Active relays are never aborted, only waited on
//! - Shutdown has a deadline: exit after the drain grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
