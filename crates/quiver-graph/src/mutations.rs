//! Write operations for the graph store.
//!
//! Every mutation is its own auto-committed transaction (`commit_now`);
//! multi-step transactions are not exposed.

use serde::Serialize;

use quiver_core::{AssignedUids, Triple, Uid};

use crate::api;
use crate::client::{GraphError, GraphStore};

impl GraphStore {
    // ── Schema ───────────────────────────────────────────────────

    /// Apply a schema alteration. The caller supplies a valid schema definition.
    pub async fn setup(&self, schema: &str) -> Result<(), GraphError> {
        let op = api::Operation {
            schema: schema.to_string(),
            ..Default::default()
        };
        self.transport().alter(op, None).await?;
        tracing::debug!(schema_len = schema.len(), "Schema applied");
        Ok(())
    }

    /// Remove all schema and data. Bounded by the configured drop-all deadline.
    pub async fn drop_all(&self) -> Result<(), GraphError> {
        let op = api::Operation {
            drop_all: true,
            ..Default::default()
        };
        self.transport()
            .alter(op, Some(self.drop_all_timeout()))
            .await?;
        tracing::info!("Dropped all schema and data");
        Ok(())
    }

    // ── Node Mutations ───────────────────────────────────────────

    /// Insert an object, returning the uids assigned to its new nodes.
    pub async fn insert<T>(&self, object: &T) -> Result<AssignedUids, GraphError>
    where
        T: Serialize + ?Sized,
    {
        let set_json = serde_json::to_vec(object)?;
        let response = self.mutate(set_mutation(set_json)).await?;

        let assigned: AssignedUids = response
            .uids
            .into_iter()
            .map(|(name, uid)| (name, Uid(uid)))
            .collect();
        tracing::debug!(assigned = assigned.len(), "Inserted object");
        Ok(assigned)
    }

    /// Write an object with set semantics.
    ///
    /// Identical to [`GraphStore::insert`] on the wire: an object carrying a
    /// `uid` updates that node, one without creates a new node. The uid is not
    /// checked for existence first.
    pub async fn update<T>(&self, object: &T) -> Result<bool, GraphError>
    where
        T: Serialize + ?Sized,
    {
        let set_json = serde_json::to_vec(object)?;
        self.mutate(set_mutation(set_json)).await?;
        Ok(true)
    }

    /// Delete the node with the given uid.
    pub async fn delete_by_uid(&self, uid: &str) -> Result<(), GraphError> {
        let delete_json = serde_json::to_vec(&serde_json::json!({ "uid": uid }))?;
        let mu = api::Mutation {
            delete_json,
            commit_now: true,
            ..Default::default()
        };
        self.mutate(mu).await?;
        tracing::debug!(uid, "Deleted node");
        Ok(())
    }

    // ── Edge Mutations ───────────────────────────────────────────

    /// Connect two existing nodes: `<subject> <relation> <object> .`
    pub async fn link(&self, relation: &str, subject: &str, object: &str) -> Result<(), GraphError> {
        self.link_triple(&Triple::new(subject, relation, object))
            .await
    }

    /// Write a single N-Quad statement.
    pub async fn link_triple(&self, triple: &Triple) -> Result<(), GraphError> {
        let mu = api::Mutation {
            set_nquads: triple.to_nquad().into_bytes(),
            commit_now: true,
            ..Default::default()
        };
        self.mutate(mu).await?;
        tracing::debug!(
            subject = %triple.subject,
            predicate = %triple.predicate,
            object = %triple.object,
            "Linked nodes"
        );
        Ok(())
    }

    /// Send one mutation as a standalone committed request.
    async fn mutate(&self, mu: api::Mutation) -> Result<api::Response, GraphError> {
        let request = api::Request {
            mutations: vec![mu],
            commit_now: true,
            ..Default::default()
        };
        self.transport().query(request).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn set_mutation(set_json: Vec<u8>) -> api::Mutation {
    api::Mutation {
        set_json,
        commit_now: true,
        ..Default::default()
    }
}
