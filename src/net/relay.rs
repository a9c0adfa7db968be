//! Bidirectional byte relay between a client and its backend.
//!
//! Each direction reads with an idle deadline and writes what it read to the
//! other side. A direction ends on EOF, on any I/O error, or when the
//! deadline passes without data; none of these are errors to the caller.
//! When a direction ends it shuts down its writer so the peer sees EOF,
//! which lets the opposite direction finish without waiting out its own
//! deadline.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::RelayConfig;
use crate::net::connection::Connection;
use crate::observability::metrics;

/// Which way bytes flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToBackend,
    BackendToClient,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ClientToBackend => "client_to_backend",
            Direction::BackendToClient => "backend_to_client",
        }
    }
}

/// How a relay direction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// The reader reached EOF.
    Closed,
    /// Nothing arrived within the idle timeout.
    Idle,
    /// A read or write failed.
    Error,
}

/// Bytes moved in each direction once both have ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelaySummary {
    pub client_to_backend: u64,
    pub backend_to_client: u64,
}

/// Byte forwarder shared by every connection.
#[derive(Debug, Clone)]
pub struct ConnectionRelay {
    idle_timeout: Duration,
    buffer_size: usize,
}

impl ConnectionRelay {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
            buffer_size: config.buffer_size.max(1),
        }
    }

    /// Forward bytes from `from` to `to` until EOF, error or idle timeout.
    pub async fn relay<R, W>(&self, mut from: R, mut to: W, direction: Direction) -> (u64, RelayEnd)
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; self.buffer_size];
        let mut total = 0u64;

        let end = loop {
            let n = match tokio::time::timeout(self.idle_timeout, from.read(&mut buf)).await {
                Ok(Ok(0)) => break RelayEnd::Closed,
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    tracing::trace!(direction = direction.as_str(), error = %e, "Relay read failed");
                    break RelayEnd::Error;
                }
                Err(_) => break RelayEnd::Idle,
            };

            if let Err(e) = to.write_all(&buf[..n]).await {
                tracing::trace!(direction = direction.as_str(), error = %e, "Relay write failed");
                break RelayEnd::Error;
            }
            total += n as u64;
        };

        let _ = to.shutdown().await;
        metrics::record_relay_bytes(direction.as_str(), total);
        tracing::trace!(direction = direction.as_str(), bytes = total, end = ?end, "Relay direction finished");
        (total, end)
    }

    /// Relay both directions of `conn` until both have ended.
    ///
    /// Client→backend runs on its own task; backend→client runs inline.
    /// Both sockets are closed when this returns.
    pub async fn run(&self, conn: Connection) -> RelaySummary {
        let Connection {
            id,
            peer,
            client,
            backend,
            backend_host,
        } = conn;
        tracing::debug!(connection_id = %id, peer = %peer, backend = %backend_host, "Relay started");

        let (client_read, client_write) = client.into_split();
        let (backend_read, backend_write) = backend.into_split();

        let upstream_relay = self.clone();
        let upstream = tokio::spawn(async move {
            upstream_relay
                .relay(client_read, backend_write, Direction::ClientToBackend)
                .await
        });

        let (backend_to_client, _) = self
            .relay(backend_read, client_write, Direction::BackendToClient)
            .await;

        let client_to_backend = match upstream.await {
            Ok((bytes, _)) => bytes,
            Err(e) => {
                tracing::warn!(connection_id = %id, error = %e, "Client relay task failed");
                0
            }
        };

        RelaySummary {
            client_to_backend,
            backend_to_client,
        }
    }
}
