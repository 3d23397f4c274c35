//! Graph store trait definitions

use crate::error::StoreResult;
use async_trait::async_trait;
use forge_core::{NodeId, Params, PropertyBag, RawNode, Relationship, Row};

/// Capabilities the mapping engine needs from a graph database
///
/// Implementations must be safe for concurrent use; the engine shares one
/// store across all tasks and holds no locks of its own.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create and persist a node with the given properties
    async fn create_node(&self, properties: PropertyBag) -> StoreResult<RawNode>;

    /// Get a node by id
    async fn get_node(&self, id: NodeId) -> StoreResult<Option<RawNode>>;

    /// Persist a node's property bag, replacing the stored one
    async fn save_node(&self, node: &RawNode) -> StoreResult<()>;

    /// Delete a node and every relationship touching it
    async fn delete_node(&self, id: NodeId) -> StoreResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Index Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a node to an index under `key = value`
    async fn index_node(
        &self,
        id: NodeId,
        index: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<()>;

    /// Nodes indexed under `key = value`, in indexing order
    async fn get_indexed_nodes(
        &self,
        index: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<Vec<RawNode>>;

    /// Nodes in `index` matching a `key:value` query, in id order
    ///
    /// Terms are OR-ed; `*` matches any key or value.
    async fn query_node_index(&self, index: &str, query: &str) -> StoreResult<Vec<RawNode>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a directed relationship `start -[rel_type]-> end`
    async fn create_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
        data: PropertyBag,
    ) -> StoreResult<Relationship>;

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a pattern-matching query with named parameters
    async fn query(&self, text: &str, params: &Params) -> StoreResult<Vec<Row>>;
}
