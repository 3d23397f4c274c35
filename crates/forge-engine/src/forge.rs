//! Engine entry point

use crate::bulk::BulkRunner;
use crate::mapper::NodeMapper;
use crate::object::MappedObject;
use crate::options::ForgeOptions;
use forge_core::value::encode_map;
use forge_core::{validate, Error, NodeId, PropertyMap, RawNode, Result, SchemaRegistry, Value};
use forge_store::GraphStore;
use std::sync::Arc;

/// Maps nodes of one store onto the entities of one schema registry
pub struct Forge<S> {
    store: Arc<S>,
    registry: Arc<SchemaRegistry>,
    mapper: NodeMapper<S>,
    options: ForgeOptions,
}

impl<S: GraphStore> Forge<S> {
    pub fn new(store: S, registry: SchemaRegistry) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(registry))
    }

    /// Build over a store and registry shared with other owners
    pub fn from_shared(store: Arc<S>, registry: Arc<SchemaRegistry>) -> Self {
        let mapper = NodeMapper::new(Arc::clone(&store), Arc::clone(&registry));
        Self {
            store,
            registry,
            mapper,
            options: ForgeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ForgeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ForgeOptions {
        &self.options
    }

    pub fn mapper(&self) -> &NodeMapper<S> {
        &self.mapper
    }

    /// Bulk operations using this engine's options
    pub fn bulk(&self) -> BulkRunner<'_, S> {
        BulkRunner::new(self)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Creation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate `properties` against the entity's required fields and create
    /// a backing node for them
    pub async fn create(&self, entity: &str, properties: PropertyMap) -> Result<MappedObject<S>> {
        let entry = self.registry.entry(entity)?;
        validate(&properties, &entry.required_fields)?;
        self.create_unchecked(entity, properties).await
    }

    pub(crate) async fn create_unchecked(
        &self,
        entity: &str,
        properties: PropertyMap,
    ) -> Result<MappedObject<S>> {
        let entry = self.registry.entry(entity)?;
        let node = self
            .store
            .create_node(encode_map(&properties))
            .await
            .map_err(|e| Error::store("create_node", e))?;
        tracing::info!("Created {} {}", entity, node.id);

        if self.options.auto_index {
            for field in &entry.indexed_fields {
                match properties.get(field) {
                    Some(value) if !value.is_blank() => {
                        self.store
                            .index_node(node.id, entity, field, &value.encode())
                            .await
                            .map_err(|e| Error::store("index_node", e))?;
                    }
                    _ => {}
                }
            }
        }

        self.mapper.spawn(entity, node)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Retrieval
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the node with `id` and map it as `entity`
    pub async fn fetch(&self, entity: &str, id: NodeId) -> Result<MappedObject<S>> {
        self.registry.entry(entity)?;
        let node = self
            .store
            .get_node(id)
            .await
            .map_err(|e| Error::store("get_node", e))?
            .ok_or_else(|| Error::not_found(format!("{} {}", entity, id)))?;
        self.mapper.spawn(entity, node)
    }

    /// First node indexed under `key = value`
    pub async fn fetch_by_index(
        &self,
        entity: &str,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<MappedObject<S>> {
        self.registry.entry(entity)?;
        let value = value.into();
        let node = self
            .store
            .get_indexed_nodes(index, key, &value.encode())
            .await
            .map_err(|e| Error::store("get_indexed_nodes", e))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("{} in index {} where {} = {}", entity, index, key, value.encode())))?;
        self.mapper.spawn(entity, node)
    }

    /// Map a node fetched elsewhere
    pub fn from_node(&self, entity: &str, node: RawNode) -> Result<MappedObject<S>> {
        self.mapper.spawn(entity, node)
    }
}
