//! A blocking facade over [`crate::client::SecureRpcClient`].
//!
//! Each operation blocks the calling thread until the exchange completes. The client owns a
//! current-thread Tokio runtime, so it must not be used from within another async runtime.

use tokio::runtime::Runtime;

use crate::client;
use crate::config::ClientConfig;
use crate::credentials::TrustedCertificate;
use crate::error::RpcError;
use crate::options::CallOptions;
use crate::proto::ResourceResponse;
use crate::proto::ShellResponse;

/// Blocking counterpart of the async client, with the same operations and errors.
#[derive(Debug)]
pub struct SecureRpcClient {
    inner: client::SecureRpcClient,
    rt: Runtime,
}

impl SecureRpcClient {
    /// Loads the configured certificate and opens a secure channel.
    pub fn connect(config: &ClientConfig) -> Result<Self, RpcError> {
        let certificate = TrustedCertificate::load(&config.cert_path)?;
        Self::with_certificate(certificate, config)
    }

    pub fn with_certificate(
        certificate: TrustedCertificate,
        config: &ClientConfig,
    ) -> Result<Self, RpcError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| {
                RpcError::ChannelEstablishment(format!("failed to start client runtime: {err}"))
            })?;
        let inner = rt.block_on(client::SecureRpcClient::with_certificate(certificate, config))?;
        Ok(Self { inner, rt })
    }

    pub fn endpoint(&self) -> &tonic::transport::Uri {
        self.inner.endpoint()
    }

    pub fn check_resources(&self) -> Result<ResourceResponse, RpcError> {
        self.rt.block_on(self.inner.check_resources())
    }

    pub fn check_resources_with(
        &self,
        options: &CallOptions,
    ) -> Result<ResourceResponse, RpcError> {
        self.rt.block_on(self.inner.check_resources_with(options))
    }

    pub fn run_shell(&self, command: impl Into<String>) -> Result<ShellResponse, RpcError> {
        self.rt.block_on(self.inner.run_shell(command))
    }

    pub fn run_shell_with(
        &self,
        command: impl Into<String>,
        options: &CallOptions,
    ) -> Result<ShellResponse, RpcError> {
        self.rt.block_on(self.inner.run_shell_with(command, options))
    }
}
