//! Configuration for the directory client.

use crate::Result;
use directory_core::Error;
use std::time::Duration;
use url::Url;

/// Default directory host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default LDAP port.
pub const DEFAULT_PORT: u16 = 389;
/// Default connection timeout (seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection parameters for one directory server.
///
/// Only connection establishment carries a timeout; individual operations
/// run until the server answers, bounded only by whatever size/time limits
/// the caller passes on a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    host: String,
    port: u16,
    connect_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DirectoryConfig {
    /// Creates a configuration for the given host and port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host does not form a valid LDAP URL.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        let candidate = format!("ldap://{host}:{port}");
        Url::parse(&candidate)
            .map_err(|err| Error::Config(format!("invalid directory endpoint `{candidate}`: {err}")))?;
        Ok(Self {
            host,
            port,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        })
    }

    /// Returns the directory host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the directory port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the `host:port` endpoint label used in error messages.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the LDAP URL for the configured endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        format!("ldap://{}:{}", self.host, self.port)
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Overrides the connection timeout in seconds.
    #[must_use]
    pub const fn with_connect_timeout_secs(mut self, seconds: u64) -> Self {
        self.connect_timeout_secs = seconds;
        self
    }
}
