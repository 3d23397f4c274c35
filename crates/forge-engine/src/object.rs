//! Mapped objects and their instance mutators
//!
//! `add`/`remove` stage changes on both the decoded properties and the
//! backing snapshot; `set` only touches the decoded properties. Nothing
//! reaches the store until [`MappedObject::save`], which writes the
//! reconciled bag with a single `save_node` call.

use crate::mapper::NodeMapper;
use forge_core::pipeline::Properties;
use forge_core::value::decode_bag;
use forge_core::{Error, NodeId, PropertyMap, RawNode, Result, Value};
use forge_store::GraphStore;

/// A raw node mapped as an instance of a schema entity
pub struct MappedObject<S> {
    entity: String,
    id: NodeId,
    identity: Value,
    properties: PropertyMap,
    node: RawNode,
    pub(crate) mapper: NodeMapper<S>,
}

impl<S> std::fmt::Debug for MappedObject<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedObject")
            .field("entity", &self.entity)
            .field("id", &self.id)
            .field("properties", &self.properties)
            .finish()
    }
}

impl<S> MappedObject<S> {
    pub(crate) fn new(entity: &str, node: RawNode, mapper: NodeMapper<S>) -> Self {
        Self {
            entity: entity.to_string(),
            id: node.id,
            identity: Value::from(node.id.0),
            properties: decode_bag(&node.properties),
            node,
            mapper,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Name of the schema entity this object was mapped as
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Last known state of the backing node, including staged changes
    pub fn node(&self) -> &RawNode {
        &self.node
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staged mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Assign in memory only; written on the next [`save`](Self::save)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// Set a property on the object and on the backing snapshot
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        self.node.properties.insert(key.clone(), value.encode());
        self.properties.insert(key, value);
    }

    pub fn add_all<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.add(key, value);
        }
    }

    /// Drop a property from the object and the backing snapshot
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.node.properties.remove(key);
        self.properties.remove(key)
    }

    pub fn remove_all<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.remove(key.as_ref());
        }
    }
}

impl<S: GraphStore> MappedObject<S> {
    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Reconcile the snapshot with the current properties and persist it
    ///
    /// Changed values are written in encoded form; null or empty values are
    /// removed, as are snapshot keys the object no longer has. The snapshot
    /// is only replaced once the store accepts the write.
    pub async fn save(&mut self) -> Result<()> {
        let mut staged = self.node.clone();
        staged
            .properties
            .retain(|key, _| self.properties.contains_key(key));

        let mut changed = 0usize;
        for (key, value) in &self.properties {
            if value.is_blank() {
                staged.properties.remove(key);
                continue;
            }
            let encoded = value.encode();
            if staged.properties.get(key) != Some(&encoded) {
                staged.properties.insert(key.clone(), encoded);
                changed += 1;
            }
        }

        self.mapper
            .store()
            .save_node(&staged)
            .await
            .map_err(|e| Error::store("save_node", e))?;

        tracing::debug!("Saved {} {} ({} changed)", self.entity, self.id, changed);
        self.node = staged;
        self.properties.retain(|_, value| !value.is_blank());
        Ok(())
    }

    /// Delete the backing node
    pub async fn delete(self) -> Result<()> {
        self.mapper
            .store()
            .delete_node(self.id)
            .await
            .map_err(|e| Error::store("delete_node", e))?;
        tracing::info!("Deleted {} {}", self.entity, self.id);
        Ok(())
    }

    /// Add this node to `index` under `key = value`
    pub async fn index(&self, index: &str, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.mapper
            .store()
            .index_node(self.id, index, key, &value.encode())
            .await
            .map_err(|e| Error::store("index_node", e))
    }
}

impl<S> Properties for MappedObject<S> {
    /// Falls back to the node identity for `id`
    fn property(&self, key: &str) -> Option<&Value> {
        match self.properties.get(key) {
            Some(value) => Some(value),
            None if key == "id" => Some(&self.identity),
            None => None,
        }
    }
}
