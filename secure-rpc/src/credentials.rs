//! Loading and validating the root certificate the client trusts.

use std::path::Path;
use std::path::PathBuf;

use rustls::RootCertStore;
use tonic::transport::Certificate;
use tonic::transport::ClientTlsConfig;
use tracing::debug;

use crate::error::RpcError;

/// A PEM-encoded root certificate used to authenticate the server during the TLS handshake.
///
/// The bytes are checked once on load: they must contain at least one well-formed X.509
/// certificate. After that the value is immutable.
#[derive(Clone, Debug)]
pub struct TrustedCertificate {
    pem: Vec<u8>,
    source: Option<PathBuf>,
}

impl TrustedCertificate {
    /// Reads and validates a certificate file.
    ///
    /// Fails with `CertificateLoad` when the file can't be read and with
    /// `ChannelEstablishment` when its contents are not a usable certificate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RpcError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|source| RpcError::CertificateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cert = Self::from_pem(pem)?;
        cert.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "loaded trusted certificate");
        Ok(cert)
    }

    /// Validates in-memory PEM bytes.
    pub fn from_pem(pem: impl Into<Vec<u8>>) -> Result<Self, RpcError> {
        let pem = pem.into();
        let count = validate_pem(&pem)?;
        debug!(certificates = count, "validated trusted certificate bytes");
        Ok(Self { pem, source: None })
    }

    /// The raw PEM bytes.
    pub fn as_pem(&self) -> &[u8] {
        &self.pem
    }

    /// The file this certificate was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Builds TLS settings that trust only this certificate and expect `domain_name`
    /// in the server's certificate.
    pub fn tls_config(&self, domain_name: &str) -> ClientTlsConfig {
        ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(&self.pem))
            .domain_name(domain_name)
    }
}

fn validate_pem(pem: &[u8]) -> Result<usize, RpcError> {
    let mut reader = pem;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| RpcError::ChannelEstablishment(format!("malformed certificate PEM: {err}")))?;

    if certs.is_empty() {
        return Err(RpcError::ChannelEstablishment(
            "no certificate found in PEM data".to_string(),
        ));
    }

    let mut roots = RootCertStore::empty();
    for cert in certs {
        roots
            .add(cert)
            .map_err(|err| RpcError::ChannelEstablishment(format!("invalid certificate: {err}")))?;
    }
    Ok(roots.len())
}
