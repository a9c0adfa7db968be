//! Name-resolution collaborators.
//!
//! A resolver turns `(resolver address, service name)` into raw text lines.
//! Interpreting those lines is left to [`crate::discovery::records`].

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Source of raw service-discovery records.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Query `resolver` for `service` and return the output lines.
    ///
    /// Implementations must release any underlying work when the returned
    /// future is dropped, so callers can enforce a deadline with
    /// `tokio::time::timeout`.
    async fn query(&self, resolver: &str, service: &str) -> io::Result<Vec<String>>;
}

/// Runs an external lookup program (`dig` by default) as
/// `<program> @<resolver> <service>` and returns its stdout lines.
///
/// The child is spawned with `kill_on_drop`, so a query abandoned at its
/// deadline takes the process down with it.
#[derive(Debug, Clone)]
pub struct DigResolver {
    program: String,
}

impl DigResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DigResolver {
    fn default() -> Self {
        Self::new("dig")
    }
}

#[async_trait]
impl NameResolver for DigResolver {
    async fn query(&self, resolver: &str, service: &str) -> io::Result<Vec<String>> {
        let output = Command::new(&self.program)
            .arg(format!("@{}", resolver))
            .arg(service)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            tracing::debug!(
                program = %self.program,
                status = %output.status,
                "Lookup program exited unsuccessfully"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_owned)
            .collect())
    }
}

/// Resolver that always answers with the same lines.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    lines: Vec<String>,
}

impl StaticResolver {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl NameResolver for StaticResolver {
    async fn query(&self, _resolver: &str, _service: &str) -> io::Result<Vec<String>> {
        Ok(self.lines.clone())
    }
}
