//! Shared fixtures for engine tests

use crate::Forge;
use async_trait::async_trait;
use forge_core::{NodeId, Params, PathExpression, PropertyBag, PropertyMap, RawNode, Relationship, Row, SchemaEntry, SchemaRegistry, Value};
use forge_store::{GraphStore, MemoryStore, StoreError, StoreResult};
use std::sync::atomic::{AtomicUsize, Ordering};

fn path(text: &str) -> PathExpression {
    PathExpression::parse(text).unwrap()
}

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_entry(
            SchemaEntry::new("Person")
                .with_required("name")
                .with_indexed("email")
                .with_navigation("friends", path("Person [KNOWS] Person"))
                .with_navigation(
                    "friend_employers",
                    path("Person [KNOWS] Person [WORKS_AT] Company"),
                )
                .with_navigation("pets", path("Person [OWNS] Pet")),
        )
        .with_entry(SchemaEntry::new("Company").with_required("title"))
}

pub fn forge() -> Forge<MemoryStore> {
    Forge::new(MemoryStore::new(), registry())
}

pub fn person(name: &str, age: i64) -> PropertyMap {
    let mut props = PropertyMap::new();
    props.insert("name".into(), Value::from(name));
    props.insert("age".into(), Value::from(age));
    props
}

/// Memory store that counts calls and fails on demand
pub struct FlakyStore {
    inner: MemoryStore,
    calls: AtomicUsize,
    creates: AtomicUsize,
    fail_name: Option<String>,
    fail_saves: bool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            fail_name: None,
            fail_saves: false,
        }
    }

    /// Refuse to create nodes whose `name` is `name`
    pub fn failing_name(mut self, name: &str) -> Self {
        self.fail_name = Some(name.to_string());
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn create_attempts(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GraphStore for FlakyStore {
    async fn create_node(&self, properties: PropertyBag) -> StoreResult<RawNode> {
        self.tick();
        self.creates.fetch_add(1, Ordering::SeqCst);
        if let Some(name) = &self.fail_name {
            if properties.get("name").and_then(|v| v.as_str()) == Some(name.as_str()) {
                return Err(StoreError::Database(format!("refused to create '{}'", name)));
            }
        }
        self.inner.create_node(properties).await
    }

    async fn get_node(&self, id: NodeId) -> StoreResult<Option<RawNode>> {
        self.tick();
        self.inner.get_node(id).await
    }

    async fn save_node(&self, node: &RawNode) -> StoreResult<()> {
        self.tick();
        if self.fail_saves {
            return Err(StoreError::Database("refused to save".into()));
        }
        self.inner.save_node(node).await
    }

    async fn delete_node(&self, id: NodeId) -> StoreResult<()> {
        self.tick();
        self.inner.delete_node(id).await
    }

    async fn index_node(
        &self,
        id: NodeId,
        index: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<()> {
        self.tick();
        self.inner.index_node(id, index, key, value).await
    }

    async fn get_indexed_nodes(
        &self,
        index: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<Vec<RawNode>> {
        self.tick();
        self.inner.get_indexed_nodes(index, key, value).await
    }

    async fn query_node_index(&self, index: &str, query: &str) -> StoreResult<Vec<RawNode>> {
        self.tick();
        self.inner.query_node_index(index, query).await
    }

    async fn create_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
        data: PropertyBag,
    ) -> StoreResult<Relationship> {
        self.tick();
        self.inner.create_relationship(start, end, rel_type, data).await
    }

    async fn query(&self, text: &str, params: &Params) -> StoreResult<Vec<Row>> {
        self.tick();
        self.inner.query(text, params).await
    }
}
