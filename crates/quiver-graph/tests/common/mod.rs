//! In-memory stand-in for a Dgraph alpha.
//!
//! Records every request it receives, assigns uids to nodes written with
//! `set_json`, honours `delete_json {"uid": ...}`, and answers the
//! `eq(<key>,<value>)` queries used by the existence check.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use quiver_graph::api;
use quiver_graph::{GraphError, GraphStore, Transport};

#[derive(Default)]
struct State {
    requests: Vec<api::Request>,
    alters: Vec<(api::Operation, Option<Duration>)>,
    schemas: Vec<String>,
    nodes: BTreeMap<String, Map<String, Value>>,
    next_uid: u64,
    fail_next: Option<tonic::Status>,
    raw_reply: Option<Vec<u8>>,
}

#[derive(Default)]
pub struct FakeDgraph {
    state: Mutex<State>,
}

impl FakeDgraph {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next call (alter or query) fail with `status`.
    pub fn fail_next(&self, status: tonic::Status) {
        self.state.lock().unwrap().fail_next = Some(status);
    }

    /// Answer the next query with these bytes instead of evaluating it.
    pub fn reply_next(&self, json: &[u8]) {
        self.state.lock().unwrap().raw_reply = Some(json.to_vec());
    }

    pub fn requests(&self) -> Vec<api::Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn alters(&self) -> Vec<(api::Operation, Option<Duration>)> {
        self.state.lock().unwrap().alters.clone()
    }

    pub fn schemas(&self) -> Vec<String> {
        self.state.lock().unwrap().schemas.clone()
    }

    pub fn node(&self, uid: &str) -> Option<Map<String, Value>> {
        self.state.lock().unwrap().nodes.get(uid).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }
}

/// A store wired to a fresh fake.
pub fn fake_store() -> (GraphStore, Arc<FakeDgraph>) {
    let fake = FakeDgraph::new();
    let store = GraphStore::with_transport(fake.clone());
    (store, fake)
}

#[async_trait]
impl Transport for FakeDgraph {
    async fn alter(
        &self,
        op: api::Operation,
        deadline: Option<Duration>,
    ) -> Result<api::Payload, GraphError> {
        let mut state = self.state.lock().unwrap();
        state.alters.push((op.clone(), deadline));
        if let Some(status) = state.fail_next.take() {
            return Err(status.into());
        }

        if op.drop_all {
            state.nodes.clear();
            state.schemas.clear();
        }
        if !op.schema.is_empty() {
            state.schemas.push(op.schema);
        }
        Ok(api::Payload::default())
    }

    async fn query(&self, request: api::Request) -> Result<api::Response, GraphError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        if let Some(status) = state.fail_next.take() {
            return Err(status.into());
        }

        let mut uids = HashMap::new();
        for mu in &request.mutations {
            state.apply(mu, &mut uids)?;
        }

        let json = if let Some(raw) = state.raw_reply.take() {
            raw
        } else if request.query.is_empty() {
            Vec::new()
        } else {
            state.evaluate(&request.query)?
        };

        Ok(api::Response {
            json,
            uids,
            ..Default::default()
        })
    }
}

impl State {
    fn apply(
        &mut self,
        mu: &api::Mutation,
        uids: &mut HashMap<String, String>,
    ) -> Result<(), GraphError> {
        if !mu.set_json.is_empty() {
            let value: Value = serde_json::from_slice(&mu.set_json)
                .map_err(|e| tonic::Status::invalid_argument(e.to_string()))?;
            match value {
                Value::Array(items) => {
                    for item in items {
                        self.set_object(item, uids)?;
                    }
                }
                other => self.set_object(other, uids)?,
            }
        }

        if !mu.delete_json.is_empty() {
            let value: Value = serde_json::from_slice(&mu.delete_json)
                .map_err(|e| tonic::Status::invalid_argument(e.to_string()))?;
            if let Some(uid) = value.get("uid").and_then(Value::as_str) {
                self.nodes.remove(uid);
            }
        }

        if !mu.set_nquads.is_empty() {
            let text = String::from_utf8_lossy(&mu.set_nquads).to_string();
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                let terms: Vec<&str> = line
                    .split_whitespace()
                    .map(|t| t.trim_start_matches('<').trim_end_matches('>'))
                    .collect();
                if terms.len() != 4 || terms[3] != "." {
                    return Err(tonic::Status::invalid_argument(format!("bad nquad: {line}")).into());
                }
                let node = self.nodes.entry(terms[0].to_string()).or_default();
                node.insert(terms[1].to_string(), json!({ "uid": terms[2] }));
            }
        }
        Ok(())
    }

    fn set_object(
        &mut self,
        value: Value,
        uids: &mut HashMap<String, String>,
    ) -> Result<(), GraphError> {
        let Value::Object(mut fields) = value else {
            return Err(tonic::Status::invalid_argument("mutation must be an object").into());
        };

        let uid = match fields.remove("uid") {
            Some(Value::String(existing)) if !existing.starts_with("_:") => existing,
            Some(Value::String(blank)) => {
                let uid = self.allocate();
                uids.insert(blank.trim_start_matches("_:").to_string(), uid.clone());
                uid
            }
            _ => {
                let uid = self.allocate();
                uids.insert(format!("dg.fake.{}", uids.len()), uid.clone());
                uid
            }
        };

        let node = self.nodes.entry(uid.clone()).or_default();
        for (k, v) in fields {
            node.insert(k, v);
        }
        node.insert("uid".to_string(), Value::String(uid));
        Ok(())
    }

    fn allocate(&mut self) -> String {
        self.next_uid += 1;
        format!("0x{:x}", self.next_uid)
    }

    /// Evaluate `eq(<key>,<value>)`; other query shapes are rejected.
    fn evaluate(&self, query: &str) -> Result<Vec<u8>, GraphError> {
        let args = query
            .split_once("eq(")
            .and_then(|(_, rest)| rest.split_once(')'))
            .and_then(|(args, _)| args.split_once(','))
            .ok_or_else(|| tonic::Status::invalid_argument(format!("unsupported query: {query}")))?;

        let key = args.0.trim();
        let wanted = args.1.trim().trim_matches('"');

        let all: Vec<Value> = self
            .nodes
            .iter()
            .filter(|(_, fields)| match fields.get(key) {
                Some(Value::String(s)) => s == wanted,
                Some(other) => other.to_string() == wanted,
                None => false,
            })
            .map(|(uid, _)| json!({ "uid": uid }))
            .collect();

        Ok(serde_json::to_vec(&json!({ "all": all }))?)
    }
}
