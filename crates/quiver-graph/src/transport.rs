//! Transport seam between the adapter and the Dgraph `api.Dgraph` service.

use std::time::Duration;

use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codec::CompressionEncoding;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

use quiver_core::StoreConfig;

use crate::api;
use crate::client::GraphError;

/// Headroom added to the `grpc-timeout` sent with a deadline, so the local
/// timer expires first and reports [`GraphError::Timeout`].
const SERVER_DEADLINE_MARGIN: Duration = Duration::from_millis(250);

/// The remote contract the adapter depends on.
///
/// Implemented by:
/// - `GrpcTransport` — a live Dgraph alpha over gRPC
/// - test fakes that record requests and answer from memory
#[async_trait]
pub trait Transport: Send + Sync {
    /// Apply a schema alteration or drop, optionally bounded by a deadline.
    async fn alter(
        &self,
        op: api::Operation,
        deadline: Option<Duration>,
    ) -> Result<api::Payload, GraphError>;

    /// Run a query and/or mutations in a single request.
    async fn query(&self, request: api::Request) -> Result<api::Response, GraphError>;
}

/// gRPC client for one Dgraph alpha.
///
/// Holds a single HTTP/2 channel; Clone is cheap and shares it.
#[derive(Clone)]
pub struct GrpcTransport {
    inner: Grpc<Channel>,
}

impl GrpcTransport {
    /// Dial the endpoint described by `config` (plaintext, optional gzip).
    pub async fn connect(config: &StoreConfig) -> Result<Self, GraphError> {
        let endpoint = Endpoint::from_shared(config.endpoint_uri())
            .map_err(|e| GraphError::Connection(e.to_string()))?
            .connect_timeout(config.connect_timeout());

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| GraphError::Connection(format!("{}: {e}", config.address())))?;

        let mut inner = Grpc::new(channel);
        if config.gzip {
            inner = inner
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip);
        }
        Ok(Self { inner })
    }

    async fn unary<M1, M2>(
        &self,
        request: tonic::Request<M1>,
        path: &'static str,
    ) -> Result<M2, tonic::Status>
    where
        M1: prost::Message + Send + Sync + 'static,
        M2: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("Service was not ready: {e}")))?;
        let codec = tonic_prost::ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn alter(
        &self,
        op: api::Operation,
        deadline: Option<Duration>,
    ) -> Result<api::Payload, GraphError> {
        let mut request = tonic::Request::new(op);
        match deadline {
            Some(after) => {
                request.set_timeout(after + SERVER_DEADLINE_MARGIN);
                tokio::time::timeout(after, self.unary::<_, api::Payload>(request, api::ALTER_PATH))
                    .await
                    .map_err(|_| GraphError::Timeout {
                        operation: "alter",
                        after,
                    })?
                    .map_err(GraphError::from)
            }
            None => self
                .unary::<_, api::Payload>(request, api::ALTER_PATH)
                .await
                .map_err(GraphError::from),
        }
    }

    async fn query(&self, request: api::Request) -> Result<api::Response, GraphError> {
        self.unary::<_, api::Response>(tonic::Request::new(request), api::QUERY_PATH)
            .await
            .map_err(GraphError::from)
    }
}
