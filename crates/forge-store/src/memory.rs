//! In-memory graph store
//!
//! Useful for testing and for running the engine without a database. Lock
//! order is always nodes, then relationships, then indexes.

use crate::error::{StoreError, StoreResult};
use crate::query;
use crate::traits::GraphStore;
use async_trait::async_trait;
use forge_core::{NodeId, Params, PropertyBag, RawNode, Relationship, RelationshipId, Row};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

type IndexKey = (String, String, String);

/// In-memory storage backend
pub struct MemoryStore {
    nodes: RwLock<BTreeMap<NodeId, PropertyBag>>,
    relationships: RwLock<Vec<Relationship>>,
    indexes: RwLock<HashMap<IndexKey, Vec<NodeId>>>,
    next_node: AtomicU64,
    next_relationship: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            relationships: RwLock::new(Vec::new()),
            indexes: RwLock::new(HashMap::new()),
            next_node: AtomicU64::new(1),
            next_relationship: AtomicU64::new(1),
        }
    }

    fn index_key(index: &str, key: &str, value: &serde_json::Value) -> IndexKey {
        (index.to_string(), key.to_string(), value.to_string())
    }

    /// Number of live nodes
    pub fn node_count(&self) -> StoreResult<usize> {
        Ok(self.nodes.read().map_err(StoreError::lock)?.len())
    }

    /// Snapshot of all relationships in creation order
    pub fn relationships(&self) -> StoreResult<Vec<Relationship>> {
        Ok(self.relationships.read().map_err(StoreError::lock)?.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    // Node operations

    async fn create_node(&self, properties: PropertyBag) -> StoreResult<RawNode> {
        let id = NodeId(self.next_node.fetch_add(1, Ordering::SeqCst));
        let mut nodes = self.nodes.write().map_err(StoreError::lock)?;
        nodes.insert(id, properties.clone());
        tracing::debug!("Created node {}", id);
        Ok(RawNode { id, properties })
    }

    async fn get_node(&self, id: NodeId) -> StoreResult<Option<RawNode>> {
        let nodes = self.nodes.read().map_err(StoreError::lock)?;
        Ok(nodes.get(&id).map(|properties| RawNode {
            id,
            properties: properties.clone(),
        }))
    }

    async fn save_node(&self, node: &RawNode) -> StoreResult<()> {
        let mut nodes = self.nodes.write().map_err(StoreError::lock)?;
        match nodes.get_mut(&node.id) {
            Some(properties) => {
                *properties = node.properties.clone();
                Ok(())
            }
            None => Err(StoreError::NodeNotFound(node.id)),
        }
    }

    async fn delete_node(&self, id: NodeId) -> StoreResult<()> {
        let mut nodes = self.nodes.write().map_err(StoreError::lock)?;
        if nodes.remove(&id).is_none() {
            return Err(StoreError::NodeNotFound(id));
        }

        let mut relationships = self.relationships.write().map_err(StoreError::lock)?;
        relationships.retain(|r| r.start != id && r.end != id);

        let mut indexes = self.indexes.write().map_err(StoreError::lock)?;
        for ids in indexes.values_mut() {
            ids.retain(|n| *n != id);
        }
        tracing::debug!("Deleted node {}", id);
        Ok(())
    }

    // Index operations

    async fn index_node(
        &self,
        id: NodeId,
        index: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<()> {
        let nodes = self.nodes.read().map_err(StoreError::lock)?;
        if !nodes.contains_key(&id) {
            return Err(StoreError::NodeNotFound(id));
        }
        let mut indexes = self.indexes.write().map_err(StoreError::lock)?;
        let entry = indexes.entry(Self::index_key(index, key, value)).or_default();
        if !entry.contains(&id) {
            entry.push(id);
        }
        Ok(())
    }

    async fn get_indexed_nodes(
        &self,
        index: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<Vec<RawNode>> {
        let nodes = self.nodes.read().map_err(StoreError::lock)?;
        let indexes = self.indexes.read().map_err(StoreError::lock)?;
        Ok(indexes
            .get(&Self::index_key(index, key, value))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| {
                        nodes.get(id).map(|properties| RawNode {
                            id: *id,
                            properties: properties.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_node_index(&self, index: &str, text: &str) -> StoreResult<Vec<RawNode>> {
        let terms = query::parse_index_query(text)?;
        let nodes = self.nodes.read().map_err(StoreError::lock)?;
        let indexes = self.indexes.read().map_err(StoreError::lock)?;

        let mut matched = BTreeSet::new();
        for ((name, key, value), ids) in indexes.iter() {
            if name == index && terms.iter().any(|t| t.matches(key, value)) {
                matched.extend(ids.iter().copied());
            }
        }
        Ok(matched
            .into_iter()
            .filter_map(|id| {
                nodes.get(&id).map(|properties| RawNode {
                    id,
                    properties: properties.clone(),
                })
            })
            .collect())
    }

    // Relationship operations

    async fn create_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
        data: PropertyBag,
    ) -> StoreResult<Relationship> {
        let nodes = self.nodes.read().map_err(StoreError::lock)?;
        for id in [start, end] {
            if !nodes.contains_key(&id) {
                return Err(StoreError::NodeNotFound(id));
            }
        }
        let relationship = Relationship {
            id: RelationshipId(self.next_relationship.fetch_add(1, Ordering::SeqCst)),
            start,
            end,
            rel_type: rel_type.to_string(),
            data,
        };
        let mut relationships = self.relationships.write().map_err(StoreError::lock)?;
        relationships.push(relationship.clone());
        tracing::debug!("Created relationship {} -[{}]-> {}", start, rel_type, end);
        Ok(relationship)
    }

    // Query operations

    async fn query(&self, text: &str, params: &Params) -> StoreResult<Vec<Row>> {
        let statement = query::parse(text)?;
        tracing::debug!("Running query {:?} with {:?}", text, params);

        if !statement.is_mutation() {
            let nodes = self.nodes.read().map_err(StoreError::lock)?;
            let relationships = self.relationships.read().map_err(StoreError::lock)?;
            return Ok(query::execute(&statement, params, &nodes, &relationships)?.rows);
        }

        let mut nodes = self.nodes.write().map_err(StoreError::lock)?;
        let mut relationships = self.relationships.write().map_err(StoreError::lock)?;
        let outcome = query::execute(&statement, params, &nodes, &relationships)?;

        relationships.retain(|r| {
            !outcome.deleted_relationships.contains(&r.id)
                && !outcome.deleted_nodes.contains(&r.start)
                && !outcome.deleted_nodes.contains(&r.end)
        });
        for id in &outcome.deleted_nodes {
            nodes.remove(id);
        }
        if !outcome.deleted_nodes.is_empty() {
            let mut indexes = self.indexes.write().map_err(StoreError::lock)?;
            for ids in indexes.values_mut() {
                ids.retain(|n| !outcome.deleted_nodes.contains(n));
            }
        }
        tracing::debug!(
            "Query deleted {} relationships and {} nodes",
            outcome.deleted_relationships.len(),
            outcome.deleted_nodes.len()
        );
        Ok(outcome.rows)
    }
}
