#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use secure_rpc::config::ClientConfig;
use secure_rpc::proto::resource_checker_server::ResourceChecker;
use secure_rpc::proto::resource_checker_server::ResourceCheckerServer;
use secure_rpc::proto::ResourceRequest;
use secure_rpc::proto::ResourceResponse;
use secure_rpc::proto::ShellRequest;
use secure_rpc::proto::ShellResponse;
use tempfile::NamedTempFile;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Identity;
use tonic::transport::Server;
use tonic::transport::ServerTlsConfig;
use tonic::Request;
use tonic::Response;
use tonic::Status;

/// Command the echo agent refuses, to exercise server-side failures.
pub const FORBIDDEN: &str = "forbidden";

/// An in-process agent that echoes shell commands and counts every request it sees.
#[derive(Clone, Default)]
pub struct EchoAgent {
    pub calls: Arc<AtomicUsize>,
    pub delay: Option<Duration>,
}

impl EchoAgent {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn record(&self) -> usize {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        n
    }
}

#[tonic::async_trait]
impl ResourceChecker for EchoAgent {
    async fn check_resources(
        &self,
        _request: Request<ResourceRequest>,
    ) -> Result<Response<ResourceResponse>, Status> {
        let n = self.record().await;
        Ok(Response::new(ResourceResponse {
            hostname: "echo-agent".to_string(),
            os: "linux".to_string(),
            start_time: format!("request-{n}"),
            ip_addresses: vec!["127.0.0.1".to_string()],
            ..Default::default()
        }))
    }

    async fn run_shell(
        &self,
        request: Request<ShellRequest>,
    ) -> Result<Response<ShellResponse>, Status> {
        self.record().await;
        let command = request.into_inner().command;
        if command == FORBIDDEN {
            return Err(Status::permission_denied("invalid token"));
        }
        let output = command.strip_prefix("echo ").unwrap_or(&command);
        Ok(Response::new(ShellResponse {
            output: format!("{output}\n"),
            error: String::new(),
        }))
    }
}

/// A TLS agent listening on a loopback port. Stops when dropped.
pub struct RunningAgent {
    pub addr: SocketAddr,
    pub cert_pem: String,
    pub cert_file: NamedTempFile,
    handle: JoinHandle<()>,
}

impl RunningAgent {
    /// Client settings that trust this agent's certificate.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.cert_file.path(), self.addr.to_string());
        config.domain_name = Some("localhost".to_string());
        config
    }
}

impl Drop for RunningAgent {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts `agent` behind a fresh self-signed certificate for `localhost`.
pub async fn spawn_agent(agent: EchoAgent) -> RunningAgent {
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_pem = certified.cert.pem();
    let key_pem = certified.key_pair.serialize_pem();

    let mut cert_file = NamedTempFile::new().unwrap();
    cert_file.write_all(cert_pem.as_bytes()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let identity = Identity::from_pem(&cert_pem, &key_pem);
    let mut server = Server::builder()
        .tls_config(ServerTlsConfig::new().identity(identity))
        .unwrap();
    let serve = server
        .add_service(ResourceCheckerServer::new(agent))
        .serve_with_incoming(TcpListenerStream::new(listener));

    let handle = tokio::spawn(async move {
        serve.await.unwrap();
    });

    RunningAgent {
        addr,
        cert_pem,
        cert_file,
        handle,
    }
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
