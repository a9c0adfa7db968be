//! Timeout enforcement for backend connects.
//!
//! Timed-out connects are distinct from refused ones in logs and metrics,
//! but both are handled the same way by the caller.

use std::time::Duration;

use tokio::net::TcpStream;

/// A failed backend connect.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("connect to {addr} timed out after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },
    #[error("connect to {addr} failed: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConnectError {
    pub fn outcome(&self) -> &'static str {
        match self {
            ConnectError::Timeout { .. } => "timeout",
            ConnectError::Io { .. } => "refused",
        }
    }
}

/// Open a TCP connection to `host:port`, giving up after `timeout`.
///
/// `host` may be an IP literal or a name; name resolution counts against the
/// same deadline.
pub async fn connect_with_timeout(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, ConnectError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(ConnectError::Io {
            addr: format!("{}:{}", host, port),
            source,
        }),
        Err(_) => Err(ConnectError::Timeout {
            addr: format!("{}:{}", host, port),
            timeout,
        }),
    }
}
