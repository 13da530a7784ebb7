//! Dgraph connection management and the shared graph store adapter.

use std::sync::Arc;
use std::time::Duration;

use tonic::Code;

use quiver_core::StoreConfig;

use crate::transport::{GrpcTransport, Transport};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error("Dgraph connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to decode Dgraph response: {0}")]
    Decode(String),

    #[error("Dgraph transport error: {0}")]
    Transport(tonic::Status),

    #[error("Dgraph rejected the request: {0}")]
    Rejected(tonic::Status),

    #[error("{operation} did not complete within {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl GraphError {
    /// Whether the failure came from the network rather than the server's verdict.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GraphError::Transport(_) | GraphError::Connection(_) | GraphError::Timeout { .. }
        )
    }
}

impl From<tonic::Status> for GraphError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
                GraphError::Transport(status)
            }
            // Dgraph reports most query, mutation, and schema errors as Unknown.
            _ => GraphError::Rejected(status),
        }
    }
}

impl From<quiver_core::CoreError> for GraphError {
    fn from(err: quiver_core::CoreError) -> Self {
        GraphError::Config(err.to_string())
    }
}

/// Adapter over a Dgraph alpha: schema setup, auto-committed mutations, and queries.
///
/// This is the single point of access for all graph operations.
/// Clone is cheap (inner Arc); clones share one connection.
#[derive(Clone)]
pub struct GraphStore {
    transport: Arc<dyn Transport>,
    drop_all_timeout: Duration,
}

impl GraphStore {
    /// Connect to Dgraph with the given configuration.
    ///
    /// The connection is established once here and reused by every operation.
    pub async fn connect(config: &StoreConfig) -> Result<Self, GraphError> {
        config.validate()?;

        let transport = GrpcTransport::connect(config).await?;

        tracing::info!(address = %config.address(), gzip = config.gzip, "Connected to Dgraph");
        Ok(Self {
            transport: Arc::new(transport),
            drop_all_timeout: config.drop_all_timeout(),
        })
    }

    /// Connect to `host:port` with default settings.
    pub async fn connect_to(host: &str, port: u16) -> Result<Self, GraphError> {
        Self::connect(&StoreConfig::new(host, port)).await
    }

    /// Build a store over an existing transport (e.g. an in-memory fake).
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            drop_all_timeout: StoreConfig::default().drop_all_timeout(),
        }
    }

    /// Override the deadline attached to [`GraphStore::drop_all`].
    pub fn with_drop_all_timeout(mut self, timeout: Duration) -> Self {
        self.drop_all_timeout = timeout;
        self
    }

    pub fn drop_all_timeout(&self) -> Duration {
        self.drop_all_timeout
    }

    /// Get a reference to the underlying transport for direct requests.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
