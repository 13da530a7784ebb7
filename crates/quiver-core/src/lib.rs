//! quiver-core: Shared types, configuration, and error handling for Quiver.
//!
//! This crate provides the foundational pieces used by the graph adapter and the CLI:
//! - Identifier types (Uid, AssignedUids) returned by the graph database
//! - The N-Quad triple used for linking existing nodes
//! - Connection configuration and its loader
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::StoreConfig;
pub use error::CoreError;
pub use types::{AssignedUids, Triple, Uid};
