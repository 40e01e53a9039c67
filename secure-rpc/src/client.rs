use std::future::Future;
use std::time::Duration;

use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tonic::transport::Uri;
use tonic::Status;
use tracing::debug;
use tracing::warn;

use crate::config::ClientConfig;
use crate::credentials::TrustedCertificate;
use crate::error::RpcError;
use crate::options::CallOptions;
use crate::proto::resource_checker_client::ResourceCheckerClient;
use crate::proto::ResourceRequest;
use crate::proto::ResourceResponse;
use crate::proto::ShellRequest;
use crate::proto::ShellResponse;

/// Builds the request for `CheckResources`. It carries no fields.
pub fn resource_request() -> ResourceRequest {
    ResourceRequest {}
}

/// Builds the request for `RunShell`. The command is passed through untouched.
pub fn shell_request(command: impl Into<String>) -> ShellRequest {
    ShellRequest {
        command: command.into(),
    }
}

/// A client for the agent's `ResourceChecker` service over a TLS-secured channel.
///
/// The client owns its channel; construct it once and pass it to whoever needs it.
/// Cloning is cheap and clones share the channel. Tonic channels are safe to use from many
/// tasks at once, so concurrent calls need no extra locking.
///
/// Every operation is a single request/response exchange. Nothing is retried or cached:
/// calling an operation twice sends two requests.
#[derive(Debug, Clone)]
pub struct SecureRpcClient {
    stub: ResourceCheckerClient<Channel>,
    endpoint: Uri,
    defaults: CallOptions,
}

impl SecureRpcClient {
    /// Loads the configured certificate and opens a secure channel to the endpoint.
    ///
    /// The connection itself is made lazily, so an unreachable endpoint is reported by the
    /// first call as `RpcError::Unavailable`.
    pub async fn connect(config: &ClientConfig) -> Result<Self, RpcError> {
        let certificate = TrustedCertificate::load(&config.cert_path)?;
        Self::with_certificate(certificate, config).await
    }

    /// Opens a secure channel that trusts `certificate`. `config.cert_path` is ignored.
    pub async fn with_certificate(
        certificate: TrustedCertificate,
        config: &ClientConfig,
    ) -> Result<Self, RpcError> {
        let uri = config.endpoint_uri()?;
        let server_name = config.server_name(&uri);
        debug!(endpoint = %uri, %server_name, "opening secure channel");

        let mut endpoint =
            Endpoint::from(uri.clone()).tls_config(certificate.tls_config(&server_name))?;
        if let Some(timeout) = config.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }
        let channel = endpoint.connect_lazy();

        Ok(Self {
            stub: ResourceCheckerClient::new(channel),
            endpoint: uri,
            defaults: config.default_call_options(),
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Asks the agent for a snapshot of its host resources.
    pub async fn check_resources(&self) -> Result<ResourceResponse, RpcError> {
        self.check_resources_with(&CallOptions::default()).await
    }

    pub async fn check_resources_with(
        &self,
        options: &CallOptions,
    ) -> Result<ResourceResponse, RpcError> {
        let deadline = options.or(self.defaults).deadline;
        let request = prepare(resource_request(), deadline);
        debug!(endpoint = %self.endpoint, ?deadline, "CheckResources");

        let mut stub = self.stub.clone();
        exchange("CheckResources", deadline, stub.check_resources(request)).await
    }

    /// Runs `command` on the agent.
    ///
    /// The command is neither validated nor sanitized here; whether it may run at all is
    /// decided by the service.
    pub async fn run_shell(&self, command: impl Into<String>) -> Result<ShellResponse, RpcError> {
        self.run_shell_with(command, &CallOptions::default()).await
    }

    pub async fn run_shell_with(
        &self,
        command: impl Into<String>,
        options: &CallOptions,
    ) -> Result<ShellResponse, RpcError> {
        let deadline = options.or(self.defaults).deadline;
        let shell = shell_request(command);
        debug!(endpoint = %self.endpoint, command = %shell.command, ?deadline, "RunShell");
        let request = prepare(shell, deadline);

        let mut stub = self.stub.clone();
        exchange("RunShell", deadline, stub.run_shell(request)).await
    }
}

fn prepare<T>(message: T, deadline: Option<Duration>) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    if let Some(deadline) = deadline {
        request.set_timeout(deadline);
    }
    request
}

async fn exchange<T, F>(
    method: &'static str,
    deadline: Option<Duration>,
    call: F,
) -> Result<T, RpcError>
where
    F: Future<Output = Result<tonic::Response<T>, Status>>,
{
    let outcome = match deadline {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(method, ?limit, "call timed out");
                return Err(RpcError::Timeout(Some(limit)));
            }
        },
        None => call.await,
    };

    match outcome {
        Ok(response) => Ok(response.into_inner()),
        Err(status) => {
            let err = RpcError::from_status(status, deadline);
            warn!(method, kind = err.kind(), %err, "call failed");
            Err(err)
        }
    }
}
