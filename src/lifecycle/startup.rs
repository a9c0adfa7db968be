//! Startup orchestration.
//!
//! Order: metrics → bind (fatal on failure) → registry and discovery →
//! serve until shutdown → stop discovery → give active relays a grace
//! period to finish on their own.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::discovery::{DiscoveryService, NameResolver};
use crate::error::ProxyError;
use crate::lifecycle::{signals, Shutdown};
use crate::load_balancer::BackendRegistry;
use crate::net::Listener;
use crate::observability::metrics;
use crate::proxy::ProxyServer;

/// Run the proxy until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig, resolver: Arc<dyn NameResolver>) -> Result<(), ProxyError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    serve(config, resolver, server_shutdown).await
}

/// Bind, serve until `shutdown` fires, then wait for active connections.
pub async fn serve(
    config: ProxyConfig,
    resolver: Arc<dyn NameResolver>,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), ProxyError> {
    let listener = Listener::bind(&config.listener).await?;

    let registry = Arc::new(BackendRegistry::with_max_wraps(config.backend.max_registry_wraps));
    let discovery = Arc::new(DiscoveryService::new(
        config.discovery.clone(),
        resolver,
        registry,
    ));
    let server = ProxyServer::new(&config, discovery);

    server.run(listener, shutdown).await?;

    let tracker = server.tracker();
    let active = tracker.active_count();
    if active > 0 {
        tracing::info!(
            active_connections = active,
            grace = ?config.listener.drain_timeout(),
            "Waiting for active connections to finish"
        );
        if !tracker.wait_for_drain(config.listener.drain_timeout()).await {
            tracing::warn!(
                active_connections = tracker.active_count(),
                "Drain timeout elapsed, exiting with connections still open"
            );
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
