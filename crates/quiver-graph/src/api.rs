//! Wire messages for Dgraph's `api.Dgraph` gRPC service.
//!
//! Pre-generated from the subset of `api.proto` this crate speaks and committed
//! to the repository, so protoc is not a build-time dependency. Field tags must
//! match the server's schema; unknown fields in responses are skipped by prost.

use std::collections::HashMap;

/// gRPC method paths.
pub const QUERY_PATH: &str = "/api.Dgraph/Query";
pub const ALTER_PATH: &str = "/api.Dgraph/Alter";

/// A query and/or a batch of mutations executed in one round trip.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(uint64, tag = "1")]
    pub start_ts: u64,
    #[prost(string, tag = "4")]
    pub query: ::prost::alloc::string::String,
    #[prost(map = "string, string", tag = "5")]
    pub vars: HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
    #[prost(bool, tag = "6")]
    pub read_only: bool,
    #[prost(bool, tag = "7")]
    pub best_effort: bool,
    #[prost(message, repeated, tag = "12")]
    pub mutations: ::prost::alloc::vec::Vec<Mutation>,
    #[prost(bool, tag = "13")]
    pub commit_now: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(bytes = "vec", tag = "1")]
    pub json: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub txn: ::core::option::Option<TxnContext>,
    /// Blank-node name → assigned uid, populated for mutations.
    #[prost(map = "string, string", tag = "12")]
    pub uids: HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Mutation {
    #[prost(bytes = "vec", tag = "1")]
    pub set_json: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub delete_json: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub set_nquads: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub del_nquads: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "9")]
    pub cond: ::prost::alloc::string::String,
    #[prost(bool, tag = "14")]
    pub commit_now: bool,
}

/// Schema alteration or drop request.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    #[prost(string, tag = "1")]
    pub schema: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub drop_attr: ::prost::alloc::string::String,
    #[prost(bool, tag = "3")]
    pub drop_all: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    #[prost(bytes = "vec", tag = "1")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxnContext {
    #[prost(uint64, tag = "1")]
    pub start_ts: u64,
    #[prost(uint64, tag = "2")]
    pub commit_ts: u64,
    #[prost(bool, tag = "3")]
    pub aborted: bool,
    #[prost(string, repeated, tag = "4")]
    pub keys: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "5")]
    pub preds: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
