//! TCP proxy server.
//!
//! # Responsibilities
//! - Start discovery before serving
//! - Accept client connections and hand each to its own task
//! - Pick a backend with bounded retries, refreshing discovery on every miss
//! - Relay bytes until the exchange completes
//! - On shutdown: stop accepting, close the listener, stop discovery
//!
//! Per-connection states:
//! ```text
//! Selecting ──none──▶ refresh ─┐
//!     │                        │ (attempt budget left)
//!     ▼                        │
//! Connecting ──fail──▶ refresh ┘
//!     │                 (budget spent) ──▶ NoBackend ──▶ Closed
//!     ▼
//! Relaying ──▶ Closed
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::config::{BackendConfig, ProxyConfig};
use crate::discovery::DiscoveryService;
use crate::error::ProxyError;
use crate::load_balancer::BackendSelector;
use crate::net::{
    Connection, ConnectionGuard, ConnectionId, ConnectionPermit, ConnectionRelay, ConnectionTracker, Listener,
};
use crate::observability::metrics;
use crate::resilience::{connect_with_timeout, AttemptBudget};

/// Delay before the next accept after an accept error (e.g. fd exhaustion).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// An established backend socket and how it was obtained.
#[derive(Debug)]
pub struct BackendConnection {
    pub stream: TcpStream,
    pub host: String,
    /// Select+connect cycles spent, including the successful one.
    pub attempts: u32,
}

struct ServerInner {
    backend: BackendConfig,
    selector: BackendSelector,
    discovery: Arc<DiscoveryService>,
    relay: ConnectionRelay,
    tracker: ConnectionTracker,
}

/// Dynamic TCP reverse proxy.
#[derive(Clone)]
pub struct ProxyServer {
    inner: Arc<ServerInner>,
}

impl ProxyServer {
    /// Build a server whose backends come from `discovery`'s registry.
    pub fn new(config: &ProxyConfig, discovery: Arc<DiscoveryService>) -> Self {
        let selector = BackendSelector::new(Arc::clone(discovery.registry()));
        Self {
            inner: Arc::new(ServerInner {
                backend: config.backend.clone(),
                selector,
                discovery,
                relay: ConnectionRelay::new(&config.relay),
                tracker: ConnectionTracker::new(),
            }),
        }
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.inner.tracker
    }

    /// Select and connect to a backend within the attempt budget.
    pub async fn connect_backend(&self) -> Result<BackendConnection, ProxyError> {
        self.inner.connect_backend(None).await
    }

    /// Serve until `shutdown` fires.
    ///
    /// Connections still relaying when this returns keep running on their
    /// own tasks; see [`ConnectionTracker::wait_for_drain`].
    pub async fn run(
        &self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ProxyError> {
        let discovery = &self.inner.discovery;
        discovery.start(discovery.config().refresh_interval()).await;

        let local_addr = listener.local_addr()?;
        tracing::info!(
            address = %local_addr,
            backend_port = self.inner.backend.port,
            "Load balancer started"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        // Tracked before spawning: a drain that starts now must include this connection.
                        let guard = self.inner.tracker.track();
                        let inner = Arc::clone(&self.inner);
                        tokio::spawn(async move {
                            inner.handle(stream, peer, guard, permit).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);
        if let Some(schedule) = discovery.stop() {
            if let Err(e) = schedule.await {
                tracing::warn!(error = %e, "Discovery task ended abnormally");
            }
        }

        tracing::info!(
            active_connections = self.inner.tracker.active_count(),
            "Load balancer closed"
        );
        Ok(())
    }
}

impl ServerInner {
    async fn handle(
        &self,
        client: TcpStream,
        peer: SocketAddr,
        guard: ConnectionGuard,
        _permit: ConnectionPermit,
    ) {
        let id = guard.id();
        metrics::record_connection_accepted();
        tracing::debug!(connection_id = %id, peer = %peer, "Connection from client");

        match self.connect_backend(Some(id)).await {
            Ok(backend) => {
                let conn = Connection {
                    id,
                    peer,
                    client,
                    backend: backend.stream,
                    backend_host: backend.host,
                };
                let summary = self.relay.run(conn).await;
                tracing::debug!(
                    connection_id = %id,
                    client_to_backend = summary.client_to_backend,
                    backend_to_client = summary.backend_to_client,
                    "Connection closed"
                );
            }
            Err(e) => {
                metrics::record_no_backend();
                tracing::warn!(connection_id = %id, peer = %peer, error = %e, "No backend available, closing client");
                drop(client);
            }
        }
    }

    async fn connect_backend(&self, id: Option<ConnectionId>) -> Result<BackendConnection, ProxyError> {
        let id = id.map(|id| id.to_string()).unwrap_or_default();
        let mut budget = AttemptBudget::new(self.backend.max_connect_attempts);

        while let Some(attempt) = budget.try_start() {
            let Some(host) = self.selector.select() else {
                tracing::debug!(connection_id = %id, attempt, "No backend known, refreshing discovery");
                self.discovery.refresh().await;
                continue;
            };

            match connect_with_timeout(&host, self.backend.port, self.backend.connect_timeout()).await {
                Ok(stream) => {
                    metrics::record_backend_connect("connected");
                    tracing::debug!(
                        connection_id = %id,
                        attempt,
                        backend = %host,
                        port = self.backend.port,
                        "Connected to backend"
                    );
                    return Ok(BackendConnection {
                        stream,
                        host,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    metrics::record_backend_connect(e.outcome());
                    tracing::warn!(connection_id = %id, attempt, error = %e, "Can't connect to backend");
                    self.discovery.refresh().await;
                }
            }
        }

        Err(ProxyError::BackendUnavailable {
            attempts: budget.used(),
        })
    }
}
