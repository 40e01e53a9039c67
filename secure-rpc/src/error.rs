use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tonic::Code;
use tonic::Status;

/// Every way a `SecureRpcClient` can fail, from loading credentials to the remote call itself.
///
/// Errors are surfaced to the caller untouched; the client never retries or recovers locally.
#[derive(Error, Debug)]
pub enum RpcError {
    /// The trusted certificate file is missing or unreadable.
    #[error("failed to load certificate from {}: {source}", .path.display())]
    CertificateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credentials or the transport could not be set up at construction (bad PEM, bad
    /// endpoint, rejected TLS configuration).
    #[error("failed to establish secure channel: {0}")]
    ChannelEstablishment(String),

    /// The endpoint could not be reached, the connection dropped, or the server failed the
    /// TLS handshake (for example with a certificate the client does not trust).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The call outlived its deadline.
    #[error("{}", timeout_message(.0))]
    Timeout(Option<Duration>),

    /// The service answered with a failure status.
    #[error("server returned {code:?}: {message}")]
    Server { code: Code, message: String },
}

fn timeout_message(deadline: &Option<Duration>) -> String {
    match deadline {
        Some(deadline) => format!("deadline of {deadline:?} exceeded"),
        None => "deadline exceeded".to_string(),
    }
}

impl RpcError {
    /// A stable name for the error kind, used when reporting failures.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::CertificateLoad { .. } => "CertificateLoadError",
            RpcError::ChannelEstablishment(_) => "ChannelEstablishmentError",
            RpcError::Unavailable(_) => "RpcUnavailableError",
            RpcError::Timeout(_) => "RpcTimeoutError",
            RpcError::Server { .. } => "RpcServerError",
        }
    }

    /// Maps a failed call, remembering the deadline that was in force for it.
    pub(crate) fn from_status(status: Status, deadline: Option<Duration>) -> Self {
        match status.code() {
            Code::Unavailable => RpcError::Unavailable(status.message().to_string()),
            Code::DeadlineExceeded => RpcError::Timeout(deadline),
            // Connection failures that tonic could not classify still arrive as `Unknown`
            // with the transport error attached.
            Code::Unknown if is_transport_failure(&status) => {
                RpcError::Unavailable(status.message().to_string())
            }
            code => RpcError::Server {
                code,
                message: status.message().to_string(),
            },
        }
    }
}

impl From<Status> for RpcError {
    fn from(status: Status) -> Self {
        RpcError::from_status(status, None)
    }
}

impl From<tonic::transport::Error> for RpcError {
    fn from(err: tonic::transport::Error) -> Self {
        RpcError::ChannelEstablishment(err.to_string())
    }
}

fn is_transport_failure(status: &Status) -> bool {
    let mut source = std::error::Error::source(status);
    while let Some(err) = source {
        if err.is::<tonic::transport::Error>() || err.is::<std::io::Error>() {
            return true;
        }
        source = err.source();
    }
    false
}
