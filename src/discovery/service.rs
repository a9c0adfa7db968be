//! Discovery service: keeps the backend registry in sync with the resolver.
//!
//! # Responsibilities
//! - Query the resolver with a hard deadline
//! - Replace the registry with whatever the query produced (possibly nothing)
//! - Run the refresh on a fixed schedule until stopped
//! - Serve on-demand refreshes from the connect path

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::config::DiscoveryConfig;
use crate::discovery::records::extract_hosts;
use crate::discovery::resolver::NameResolver;
use crate::load_balancer::BackendRegistry;
use crate::observability::metrics;

/// Why a refresh produced no hosts.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no answer from resolver {resolver} within {timeout:?}")]
    Timeout { resolver: String, timeout: Duration },
    #[error("no service ({service}) found")]
    Empty { service: String },
    #[error("resolver query failed: {0}")]
    Query(#[from] std::io::Error),
}

/// Result of one refresh, after the registry has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Query answered with this many hosts.
    Found(usize),
    /// Query answered but no record matched the service.
    Empty,
    /// Query missed its deadline and was abandoned.
    TimedOut,
    /// Query could not be run.
    Failed,
}

impl Refresh {
    fn label(&self) -> &'static str {
        match self {
            Refresh::Found(_) => "found",
            Refresh::Empty => "empty",
            Refresh::TimedOut => "timeout",
            Refresh::Failed => "failed",
        }
    }
}

struct Schedule {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Periodic and on-demand backend discovery.
pub struct DiscoveryService {
    config: DiscoveryConfig,
    resolver: Arc<dyn NameResolver>,
    registry: Arc<BackendRegistry>,
    schedule: Mutex<Option<Schedule>>,
}

impl DiscoveryService {
    pub fn new(
        config: DiscoveryConfig,
        resolver: Arc<dyn NameResolver>,
        registry: Arc<BackendRegistry>,
    ) -> Self {
        Self {
            config,
            resolver,
            registry,
            schedule: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Query the resolver and replace the registry with the result.
    ///
    /// Never fails: a timeout, a query error or an empty answer all leave the
    /// registry empty and log a single warning.
    pub async fn refresh(&self) -> Refresh {
        let outcome = match self.lookup().await {
            Ok(hosts) => {
                let count = hosts.len();
                tracing::debug!(service = %self.config.service, hosts = ?hosts, "Found hosts");
                self.registry.replace(hosts);
                Refresh::Found(count)
            }
            Err(err) => {
                tracing::warn!(
                    resolver = %self.config.resolver,
                    service = %self.config.service,
                    "{}",
                    err
                );
                self.registry.replace(Vec::new());
                match err {
                    DiscoveryError::Timeout { .. } => Refresh::TimedOut,
                    DiscoveryError::Empty { .. } => Refresh::Empty,
                    DiscoveryError::Query(_) => Refresh::Failed,
                }
            }
        };
        metrics::record_discovery(outcome.label());
        outcome
    }

    async fn lookup(&self) -> Result<Vec<String>, DiscoveryError> {
        let timeout = self.config.query_timeout();
        let query = self.resolver.query(&self.config.resolver, &self.config.service);

        // Elapsing drops the query future, which abandons the lookup.
        let lines = time::timeout(timeout, query)
            .await
            .map_err(|_| DiscoveryError::Timeout {
                resolver: self.config.resolver.clone(),
                timeout,
            })??;

        let hosts: Vec<String> = extract_hosts(
            lines.iter().map(String::as_str),
            &self.config.service,
            self.config.host_field,
        )
        .map(str::to_owned)
        .collect();

        if hosts.is_empty() {
            return Err(DiscoveryError::Empty {
                service: self.config.service.clone(),
            });
        }
        Ok(hosts)
    }

    /// Refresh now, then keep refreshing every `interval` until [`stop`].
    ///
    /// Calling `start` on a running service replaces the previous schedule.
    ///
    /// [`stop`]: DiscoveryService::stop
    pub async fn start(self: &Arc<Self>, interval: Duration) -> Refresh {
        let initial = self.refresh().await;

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let service = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // A stop that arrives during a refresh wins over the next tick.
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => {
                        tracing::debug!("Discovery schedule stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        service.refresh().await;
                    }
                }
            }
        });

        tracing::info!(
            service = %self.config.service,
            resolver = %self.config.resolver,
            interval = ?interval,
            "Discovery started"
        );

        if let Some(previous) = self.schedule.lock().replace(Schedule { stop_tx, task }) {
            let _ = previous.stop_tx.send(true);
        }
        initial
    }

    /// Cancel the pending schedule. A refresh already in flight completes.
    ///
    /// Returns the schedule task so callers may wait for it to finish.
    pub fn stop(&self) -> Option<JoinHandle<()>> {
        let schedule = self.schedule.lock().take()?;
        let _ = schedule.stop_tx.send(true);
        Some(schedule.task)
    }

    pub fn is_running(&self) -> bool {
        self.schedule
            .lock()
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }
}
