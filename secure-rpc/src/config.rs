use std::path::PathBuf;
use std::time::Duration;

use tonic::transport::Uri;

use crate::error::RpcError;
use crate::options::CallOptions;

/// Default location of the trusted root certificate.
pub const DEFAULT_CERT_PATH: &str = "server.crt";

/// Default agent address.
pub const DEFAULT_ENDPOINT: &str = "localhost:50051";

/// Everything needed to open a secure channel to an agent.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// PEM root certificate the server must chain to.
    pub cert_path: PathBuf,
    /// `host:port`, optionally prefixed with `https://`.
    pub endpoint: String,
    /// Name expected in the server certificate. Defaults to the endpoint host.
    pub domain_name: Option<String>,
    /// Limit on establishing the TCP/TLS connection.
    pub connect_timeout: Option<Duration>,
    /// Deadline applied to calls that don't set their own.
    pub deadline: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cert_path: PathBuf::from(DEFAULT_CERT_PATH),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            domain_name: None,
            connect_timeout: None,
            deadline: None,
        }
    }
}

impl ClientConfig {
    pub fn new(cert_path: impl Into<PathBuf>, endpoint: impl Into<String>) -> Self {
        Self {
            cert_path: cert_path.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Parses the endpoint into an `https` URI.
    pub fn endpoint_uri(&self) -> Result<Uri, RpcError> {
        let endpoint = self.endpoint.trim();
        let with_scheme = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };

        let uri: Uri = with_scheme.parse().map_err(|err| {
            RpcError::ChannelEstablishment(format!("invalid endpoint {endpoint:?}: {err}"))
        })?;

        if uri.scheme_str() != Some("https") {
            return Err(RpcError::ChannelEstablishment(format!(
                "endpoint {endpoint:?} must use https"
            )));
        }
        if uri.host().is_none() {
            return Err(RpcError::ChannelEstablishment(format!(
                "endpoint {endpoint:?} has no host"
            )));
        }
        Ok(uri)
    }

    /// The TLS server name: the explicit override, else the endpoint host.
    pub fn server_name(&self, uri: &Uri) -> String {
        match &self.domain_name {
            Some(name) => name.clone(),
            None => uri
                .host()
                .unwrap_or_default()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_string(),
        }
    }

    pub(crate) fn default_call_options(&self) -> CallOptions {
        CallOptions {
            deadline: self.deadline,
        }
    }
}
