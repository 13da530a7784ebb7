//! Read operations and the existence-check query builder.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use quiver_core::Uid;

use crate::api;
use crate::client::{GraphError, GraphStore};

/// Raw result of a query: the server's JSON payload.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    json: Vec<u8>,
}

impl QueryResult {
    pub fn new(json: Vec<u8>) -> Self {
        Self { json }
    }

    /// The JSON bytes exactly as returned by the server.
    pub fn json(&self) -> &[u8] {
        &self.json
    }

    /// Decode the payload into a caller-defined shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, GraphError> {
        serde_json::from_slice(&self.json).map_err(|e| GraphError::Decode(e.to_string()))
    }

    /// Decode into an untyped JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, GraphError> {
        self.decode()
    }
}

/// Outcome of an existence check.
///
/// Keeps "found nothing" apart from "could not check".
#[derive(Debug)]
pub enum Existence {
    Found,
    NotFound,
    CheckFailed(GraphError),
}

impl Existence {
    /// Legacy boolean view: only `Found` is true, failures read as absent.
    pub fn is_found(&self) -> bool {
        matches!(self, Existence::Found)
    }

    /// Propagate a failed check as an error instead of treating it as absent.
    pub fn into_result(self) -> Result<bool, GraphError> {
        match self {
            Existence::Found => Ok(true),
            Existence::NotFound => Ok(false),
            Existence::CheckFailed(e) => Err(e),
        }
    }
}

#[derive(Deserialize)]
struct AllUids {
    #[serde(default)]
    all: Vec<UidEntry>,
}

#[derive(Deserialize)]
struct UidEntry {
    #[allow(dead_code)]
    uid: Uid,
}

impl GraphStore {
    /// Execute a query verbatim as a read-only request.
    pub async fn query(&self, query: &str) -> Result<QueryResult, GraphError> {
        let request = api::Request {
            query: query.to_string(),
            read_only: true,
            ..Default::default()
        };
        let response = self.transport().query(request).await?;
        Ok(QueryResult::new(response.json))
    }

    /// Execute a query and decode its payload into `T`.
    pub async fn query_as<T: DeserializeOwned>(&self, query: &str) -> Result<T, GraphError> {
        self.query(query).await?.decode()
    }

    /// Check whether any node has `key` equal to `value`.
    ///
    /// `value` is substituted into the query verbatim, so string values must
    /// carry their own quotes (e.g. `"\"Alice\""`).
    pub async fn is_existed(&self, key: &str, value: impl fmt::Display) -> Existence {
        let q = existence_query(key, value);
        let decoded = match self.query(&q).await {
            Ok(result) => result.decode::<AllUids>(),
            Err(e) => Err(e),
        };

        match decoded {
            Ok(found) if found.all.is_empty() => Existence::NotFound,
            Ok(_) => Existence::Found,
            Err(e) => {
                tracing::warn!(key, error = %e, "Existence check failed");
                Existence::CheckFailed(e)
            }
        }
    }
}

// ── Query Builder ────────────────────────────────────────────────

/// `{ all(func: eq(<key>,<value>)) { uid } }`
pub fn existence_query(key: &str, value: impl fmt::Display) -> String {
    format!("{{ all(func: eq({key},{value})) {{ uid }} }}")
}
