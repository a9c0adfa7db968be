//! Top-level error type.
//!
//! Only configuration and bind failures stop the process. Everything that
//! can go wrong with a single client connection is logged and recovered
//! where it happens; [`ProxyError::BackendUnavailable`] is the one such case
//! that crosses a function boundary, and it only closes that client.

use crate::config::ConfigError;
use crate::net::ListenerError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("no backend available after {attempts} attempt(s)")]
    BackendUnavailable { attempts: u32 },

    #[error("metrics endpoint: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
