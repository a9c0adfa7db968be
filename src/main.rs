//! Dynamic TCP reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                  DYNAPROXY                        │
//!                     │                                                   │
//!   Client ──────────▶│  ┌─────────┐    ┌─────────┐    ┌─────────────┐   │
//!                     │  │   net   │───▶│  proxy  │───▶│load_balancer│   │
//!                     │  │listener │    │ server  │    │  selector   │   │
//!                     │  └─────────┘    └────┬────┘    └──────┬──────┘   │
//!                     │                      │                ▲          │
//!                     │                      ▼                │          │
//!   Client ◀──────────│  ┌─────────┐    ┌─────────┐    ┌──────┴──────┐   │
//!                     │  │   net   │◀──▶│ backend │    │  discovery  │◀──┼── Resolver
//!                     │  │  relay  │    │ connect │    │  (periodic) │   │   (dig)
//!                     │  └────┬────┘    └─────────┘    └─────────────┘   │
//!                     └───────┼───────────────────────────────────────────┘
//!                             ▼
//!                          Backend
//! ```
//!
//! Settings come from an optional TOML file (`--config`), then the
//! per-option flags below.

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use dynaproxy::config::{loader, ProxyConfig};
use dynaproxy::discovery::DigResolver;
use dynaproxy::lifecycle::startup;
use dynaproxy::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "dynaproxy")]
#[command(about = "Dynamic TCP reverse proxy with resolver-driven service discovery", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address of the name-resolution service.
    #[arg(long)]
    dns: Option<String>,

    /// Service name to resolve.
    #[arg(long)]
    service: Option<String>,

    /// Front-facing listen port.
    #[arg(long)]
    front_port: Option<u16>,

    /// Port the backends listen on.
    #[arg(long)]
    back_port: Option<u16>,

    /// Discovery refresh interval in milliseconds.
    #[arg(long)]
    refresh: Option<u64>,

    /// Resolver query and backend connect timeout in milliseconds.
    #[arg(long)]
    timeout: Option<u64>,
}

impl Cli {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(dns) = &self.dns {
            config.discovery.resolver = dns.clone();
        }
        if let Some(service) = &self.service {
            config.discovery.service = service.clone();
        }
        if let Some(port) = self.front_port {
            config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("0.0.0.0:{}", port),
            };
        }
        if let Some(port) = self.back_port {
            config.backend.port = port;
        }
        if let Some(refresh) = self.refresh {
            config.discovery.refresh_interval_ms = refresh;
        }
        if let Some(timeout) = self.timeout {
            config.discovery.query_timeout_ms = timeout;
            config.backend.connect_timeout_ms = timeout;
        }
    }

    fn load(&self) -> Result<ProxyConfig, loader::ConfigError> {
        let mut config = match &self.config {
            Some(path) => loader::read_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply(&mut config);
        loader::validate(&config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        resolver = %config.discovery.resolver,
        service = %config.discovery.service,
        backend_port = config.backend.port,
        refresh_ms = config.discovery.refresh_interval_ms,
        "Configuration loaded"
    );

    let resolver = Arc::new(DigResolver::new(config.discovery.command.clone()));
    startup::run(config, resolver).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "dynaproxy",
            "--dns",
            "10.0.0.53",
            "--service",
            "api.dev.docker",
            "--front-port",
            "9000",
            "--back-port",
            "8080",
            "--timeout",
            "250",
        ]);
        let config = cli.load().unwrap();

        assert_eq!(config.discovery.resolver, "10.0.0.53");
        assert_eq!(config.discovery.service, "api.dev.docker");
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.backend.port, 8080);
        assert_eq!(config.discovery.query_timeout_ms, 250);
        assert_eq!(config.backend.connect_timeout_ms, 250);
    }

    #[test]
    fn invalid_override_fails_validation() {
        let cli = Cli::parse_from(["dynaproxy", "--refresh", "0"]);
        assert!(cli.load().is_err());
    }
}
