//! Raw node to mapped object conversion

use crate::object::MappedObject;
use forge_core::{Error, RawNode, Result, SchemaRegistry};
use forge_store::GraphStore;
use std::sync::Arc;

/// Turns raw nodes into [`MappedObject`]s bound to a schema entity
///
/// Holds the shared store and registry; every spawned object keeps a clone of
/// the mapper so its navigation and mutation methods can reach both.
pub struct NodeMapper<S> {
    store: Arc<S>,
    registry: Arc<SchemaRegistry>,
}

impl<S> Clone for NodeMapper<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: GraphStore> NodeMapper<S> {
    pub fn new(store: Arc<S>, registry: Arc<SchemaRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Map `node` as an instance of `entity`
    ///
    /// Stored JSON text is decoded into structured values. Required fields are
    /// not re-checked: nodes written by other tools map as they are.
    pub fn spawn(&self, entity: &str, node: RawNode) -> Result<MappedObject<S>> {
        if !self.registry.contains(entity) {
            return Err(Error::UnknownEntity(entity.to_string()));
        }
        tracing::debug!("Mapping node {} as {}", node.id, entity);
        Ok(MappedObject::new(entity, node, self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::registry;
    use forge_core::Value;
    use forge_store::MemoryStore;
    use serde_json::json;

    fn mapper() -> NodeMapper<MemoryStore> {
        NodeMapper::new(Arc::new(MemoryStore::new()), Arc::new(registry()))
    }

    #[test]
    fn test_spawn_decodes_structured_text() {
        let node = RawNode::new(7u64)
            .with_property("name", "Ada")
            .with_property("tags", r#"["math","engines"]"#)
            .with_property("bio", "likes [brackets");

        let obj = mapper().spawn("Person", node).unwrap();
        assert_eq!(obj.id().0, 7);
        assert_eq!(obj.entity(), "Person");
        assert_eq!(obj.get("name"), Some(&Value::from("Ada")));
        assert_eq!(
            obj.get("tags").and_then(Value::as_structured),
            Some(&json!(["math", "engines"]))
        );
        assert_eq!(obj.get("bio"), Some(&Value::from("likes [brackets")));
        assert_eq!(obj.node().get("tags"), Some(&json!(r#"["math","engines"]"#)));
    }

    #[test]
    fn test_spawn_skips_required_check() {
        let obj = mapper().spawn("Person", RawNode::new(1u64)).unwrap();
        assert!(obj.properties().is_empty());
    }

    #[test]
    fn test_spawn_unknown_entity() {
        let err = mapper().spawn("Robot", RawNode::new(1u64)).unwrap_err();
        assert!(matches!(err, Error::UnknownEntity(name) if name == "Robot"));
    }
}
