//! The secure-rpc prelude for convenient importing of the most common items.

pub use crate::builder::ClientBuilder;
pub use crate::client::SecureRpcClient;
pub use crate::config::ClientConfig;
pub use crate::credentials::TrustedCertificate;
pub use crate::error::RpcError;
pub use crate::options::CallOptions;
pub use crate::proto::ResourceResponse;
pub use crate::proto::ShellResponse;
