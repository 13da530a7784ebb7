//! Quiver Graph — Dgraph adapter for schema setup, mutations, and queries.
//!
//! This crate is the single access point to the Dgraph alpha. All reads and
//! writes flow through [`GraphStore`], which owns one long-lived gRPC
//! connection and commits every mutation immediately.

pub mod api;
pub mod client;
pub mod mutations;
pub mod queries;
pub mod transport;

pub use client::{GraphError, GraphStore};
pub use queries::{existence_query, Existence, QueryResult};
pub use transport::{GrpcTransport, Transport};
