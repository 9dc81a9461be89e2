//! Common types shared between the Sherlock services and the sherlock CLI
//!
//! The central type is [`ClusterDescriptor`], the connection descriptor for a
//! Druid broker that anomaly jobs query against.

pub mod allowlist;
pub mod cluster;
pub mod config;
pub mod status;

pub use allowlist::BrokerAllowList;
pub use cluster::ClusterDescriptor;
pub use config::{ConfigError, SherlockConfig};
pub use status::{ClusterStatus, DEFAULT_PROBE_TIMEOUT};

/// Sherlock error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A descriptor failed validation. The payload is the user-facing message.
    #[error("{0}")]
    InvalidConfig(String),

    #[error("Broker probe failed: {0}")]
    Probe(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Message carried by the error, without any prefix
    pub fn message(&self) -> String {
        match self {
            Self::InvalidConfig(msg) | Self::Probe(msg) => msg.clone(),
            Self::Config(err) => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
