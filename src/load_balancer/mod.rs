//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Discovery refresh
//!     → registry.rs (replace host list under the lock)
//!
//! Accepted connection
//!     → selector.rs (ask for a candidate)
//!     → registry.rs (read at cursor, advance, wrap on empty/short list)
//!     → host string or None
//! ```
//!
//! # Design Decisions
//! - One lock guards host list and cursor together
//! - Registry is an owned instance shared by Arc, never a global
//! - Selection never blocks on I/O; the lock is held only for the read

pub mod registry;
pub mod selector;

pub use registry::BackendRegistry;
pub use selector::BackendSelector;
