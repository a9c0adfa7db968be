//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (id, live-connection tracking, socket pair)
//!     → relay.rs (byte forwarding in both directions)
//!
//! Connection States:
//!     Selecting → Connecting → Relaying → Closed
//!                      ↘ NoBackend → Closed
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Sockets are owned by one task and closed by drop on every path
//! - The proxy never inspects the bytes it forwards

pub mod connection;
pub mod listener;
pub mod relay;

pub use connection::{Connection, ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
pub use relay::{ConnectionRelay, Direction, RelayEnd, RelaySummary};
