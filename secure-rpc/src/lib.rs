//! A TLS-secured gRPC client for the agent `ResourceChecker` service.
//!
//! The client trusts exactly one root certificate, opens a secure channel to a configured
//! endpoint and exposes the two remote operations as typed calls: a resource check and a
//! remote shell command.

/// The secure-rpc prelude for convenient importing of the most common items.
pub mod prelude;

/// Contains the async `SecureRpcClient`.
pub mod client;
/// Contains the blocking `SecureRpcClient`.
pub mod blocking;
/// Contains the `ClientBuilder` for configuring and opening clients.
pub mod builder;
/// Contains `ClientConfig` and its defaults.
pub mod config;
/// Contains `TrustedCertificate`.
pub mod credentials;
/// Contains the error types used by the library.
pub mod error;
/// Contains per-call `CallOptions`.
pub mod options;
mod report;

/// Messages and stubs generated from `proto/agent.proto`.
///
/// Besides the client stub this also carries the `resource_checker_server` trait and router, so
/// callers can stand up an in-process agent double against the same contract (the crate's own
/// integration tests do exactly that). Nothing in the client depends on it.
pub mod proto {
    tonic::include_proto!("agent");
}

// --- Public Dependency Re-exports (For Version Safety) ---

pub use tonic;

pub use client::resource_request;
pub use client::shell_request;
pub use client::SecureRpcClient;
pub use error::RpcError;
