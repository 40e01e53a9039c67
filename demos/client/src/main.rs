use std::fmt::Display;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap::ValueEnum;
use secure_rpc::blocking::SecureRpcClient;
use secure_rpc::config::ClientConfig;
use secure_rpc::config::DEFAULT_CERT_PATH;
use secure_rpc::config::DEFAULT_ENDPOINT;
use secure_rpc::RpcError;
use serde::Serialize;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Checks an agent's resources, then runs one shell command on it, over a TLS channel.
#[derive(Parser, Debug)]
#[command(name = "secure-rpc-client")]
#[command(version)]
#[command(about = "Query a ResourceChecker agent over a secure channel", long_about = None)]
struct Cli {
    /// PEM root certificate the agent must present
    #[arg(long, env = "SECURE_RPC_CERT_PATH", default_value = DEFAULT_CERT_PATH)]
    cert_path: PathBuf,

    /// Agent address as host:port
    #[arg(long, env = "SECURE_RPC_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Shell command to run remotely; `-` reads one line from stdin
    #[arg(long, env = "SECURE_RPC_COMMAND", default_value = "echo Hello, World!")]
    command: String,

    /// Name expected in the agent certificate (defaults to the endpoint host)
    #[arg(long, env = "SECURE_RPC_DOMAIN_NAME")]
    domain_name: Option<String>,

    /// Abort each call after this many milliseconds
    #[arg(long, env = "SECURE_RPC_DEADLINE_MS")]
    deadline_ms: Option<u64>,

    /// How to print responses
    #[arg(long, value_enum, default_value_t = Output::Text)]
    output: Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    Text,
    Json,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.cert_path, &self.endpoint);
        config.domain_name = self.domain_name.clone();
        config.deadline = self.deadline_ms.map(Duration::from_millis);
        config
    }

    fn resolve_command(&self) -> anyhow::Result<String> {
        if self.command != "-" {
            return Ok(self.command.clone());
        }
        eprint!("shell command: ");
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read command from stdin")?;
        Ok(line.trim().to_string())
    }
}

fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(rpc) = err.downcast_ref::<RpcError>() {
                error!(kind = rpc.kind(), %rpc, "request failed");
            }
            eprintln!("{}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

/// One-line failure report; client errors are tagged with their kind.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RpcError>() {
        Some(rpc) => format!("error[{}]: {rpc}", rpc.kind()),
        None => format!("error: {err:#}"),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.client_config();
    let command = cli.resolve_command()?;

    info!(
        endpoint = %config.endpoint,
        cert = %config.cert_path.display(),
        "connecting to agent"
    );
    let client = SecureRpcClient::connect(&config)?;

    let resources = client.check_resources()?;
    print_response(cli.output, "CheckResources", &resources)?;

    info!(%command, "running shell command");
    let shell = client.run_shell(command)?;
    print_response(cli.output, "RunShell", &shell)?;

    Ok(())
}

fn print_response<T>(output: Output, method: &str, response: &T) -> anyhow::Result<()>
where
    T: Display + Serialize,
{
    match output {
        Output::Text => println!("{method} Response:\n{response}\n"),
        Output::Json => println!("{}", serde_json::to_string(response)?),
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only the responses.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_client_config() {
        let cli = Cli::try_parse_from([
            "secure-rpc-client",
            "--cert-path",
            "/etc/agent/ca.pem",
            "--endpoint",
            "10.0.0.5:50051",
            "--domain-name",
            "agent-5",
            "--deadline-ms",
            "1500",
            "--output",
            "json",
        ])
        .unwrap();

        let config = cli.client_config();
        assert_eq!(config.cert_path, PathBuf::from("/etc/agent/ca.pem"));
        assert_eq!(config.endpoint, "10.0.0.5:50051");
        assert_eq!(config.domain_name.as_deref(), Some("agent-5"));
        assert_eq!(config.deadline, Some(Duration::from_millis(1500)));
        assert_eq!(cli.output, Output::Json);
    }

    #[test]
    fn client_errors_are_reported_with_their_kind() {
        let cli = Cli::try_parse_from([
            "secure-rpc-client",
            "--cert-path",
            "/nonexistent/server.crt",
        ])
        .unwrap();

        let err = run(&cli).unwrap_err();
        let report = describe(&err);
        assert!(
            report.starts_with("error[CertificateLoadError]: failed to load certificate from"),
            "got {report}"
        );
        assert!(report.contains("/nonexistent/server.crt"));
    }

    #[test]
    fn other_errors_are_reported_plainly() {
        let err = anyhow::anyhow!("stdin closed").context("failed to read command from stdin");
        assert_eq!(
            describe(&err),
            "error: failed to read command from stdin: stdin closed"
        );
    }

    #[test]
    fn command_flag_is_used_verbatim() {
        let cli = Cli::try_parse_from(["secure-rpc-client", "--command", "uptime -p"]).unwrap();
        assert_eq!(cli.resolve_command().unwrap(), "uptime -p");
    }
}
