use std::path::PathBuf;
use std::time::Duration;

use crate::blocking;
use crate::client::SecureRpcClient;
use crate::config::ClientConfig;
use crate::error::RpcError;

/// A builder for configuring and opening a secure client.
///
/// This provides a fluent interface over [`ClientConfig`], ending in either an async or a
/// blocking client that share the same settings.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` starting from the defaults
    /// (`server.crt`, `localhost:50051`, no deadline).
    pub fn new() -> Self {
        Self::default()
    }

    /// Path to the PEM root certificate the server must present a chain to.
    pub fn cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cert_path = path.into();
        self
    }

    /// Target address as `host:port`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Overrides the name checked against the server certificate.
    pub fn domain_name(mut self, name: impl Into<String>) -> Self {
        self.config.domain_name = Some(name.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Deadline for every call that doesn't pass its own.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = Some(deadline);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Consumes the builder and opens an async client.
    pub async fn connect(self) -> Result<SecureRpcClient, RpcError> {
        SecureRpcClient::connect(&self.config).await
    }

    /// Consumes the builder and opens a blocking client.
    pub fn connect_blocking(self) -> Result<blocking::SecureRpcClient, RpcError> {
        blocking::SecureRpcClient::connect(&self.config)
    }
}

impl From<ClientConfig> for ClientBuilder {
    fn from(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_settings_land_in_config() {
        let builder = ClientBuilder::new()
            .cert_path("/etc/agent/ca.pem")
            .endpoint("10.0.0.5:50051")
            .domain_name("agent-5")
            .connect_timeout(Duration::from_secs(3))
            .deadline(Duration::from_secs(10));

        let config = builder.config();
        assert_eq!(config.cert_path, PathBuf::from("/etc/agent/ca.pem"));
        assert_eq!(config.endpoint, "10.0.0.5:50051");
        assert_eq!(config.domain_name.as_deref(), Some("agent-5"));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.deadline, Some(Duration::from_secs(10)));
    }

    #[test]
    fn blocking_connect_without_certificate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientBuilder::new()
            .cert_path(dir.path().join("absent.crt"))
            .connect_blocking()
            .unwrap_err();
        assert!(matches!(err, RpcError::CertificateLoad { .. }));
    }
}
