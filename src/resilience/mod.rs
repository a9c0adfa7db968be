//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Connection needs a backend:
//!     → retries.rs (take one attempt from the budget)
//!     → timeouts.rs (connect with deadline)
//!     → On failure: refresh discovery, take the next attempt
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - The budget is per client connection, not global
//! - No backoff between attempts; a discovery refresh runs between them

pub mod retries;
pub mod timeouts;

pub use retries::AttemptBudget;
pub use timeouts::{connect_with_timeout, ConnectError};
