//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use dynaproxy::config::{ListenerConfig, ProxyConfig};
use dynaproxy::discovery::{DiscoveryService, NameResolver};
use dynaproxy::lifecycle::Shutdown;
use dynaproxy::load_balancer::BackendRegistry;
use dynaproxy::net::Listener;
use dynaproxy::ProxyServer;

pub const SERVICE: &str = "whoami.dev.docker";

/// A `dig` answer line for `host`.
pub fn record(host: &str) -> String {
    format!("{}.\t20\tIN\tA\t{}", SERVICE, host)
}

/// Resolver that plays back one answer per call, repeating the last one.
pub struct ScriptedResolver {
    answers: Vec<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    pub fn new(answers: Vec<Vec<&str>>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|hosts| hosts.into_iter().map(record).collect())
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameResolver for ScriptedResolver {
    async fn query(&self, _resolver: &str, _service: &str) -> io::Result<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .answers
            .get(call)
            .or_else(|| self.answers.last())
            .cloned()
            .unwrap_or_default();
        Ok(answer)
    }
}

/// Start an echo backend on an ephemeral loopback port.
/// Returns its address and a counter of accepted connections.
pub async fn start_echo_backend() -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if socket.write_all(&buf[..n]).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });

    (addr, accepted)
}

/// Config pointing at `backend_port` with a loopback listener.
pub fn test_config(backend_port: u16) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener = ListenerConfig {
        bind_address: "127.0.0.1:0".into(),
        ..ListenerConfig::default()
    };
    config.discovery.service = SERVICE.into();
    config.discovery.query_timeout_ms = 500;
    config.discovery.refresh_interval_ms = 60_000;
    config.backend.port = backend_port;
    config.backend.connect_timeout_ms = 500;
    config
}

pub struct TestProxy {
    pub addr: SocketAddr,
    pub server: ProxyServer,
    pub discovery: Arc<DiscoveryService>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), dynaproxy::ProxyError>>,
}

/// Bind and run a proxy in the background.
pub async fn start_proxy(config: ProxyConfig, resolver: Arc<dyn NameResolver>) -> TestProxy {
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let registry = Arc::new(BackendRegistry::with_max_wraps(config.backend.max_registry_wraps));
    let discovery = Arc::new(DiscoveryService::new(config.discovery.clone(), resolver, registry));
    let server = ProxyServer::new(&config, discovery.clone());

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let runner = server.clone();
    let handle = tokio::spawn(async move { runner.run(listener, rx).await });

    TestProxy {
        addr,
        server,
        discovery,
        shutdown,
        handle,
    }
}
