//! Relationship binding and severing

use crate::object::MappedObject;
use forge_core::value::encode_map;
use forge_core::{CompiledQuery, Error, NavigationCompiler, NodeId, PropertyMap, RawNode, Relationship, Result};
use forge_store::GraphStore;

/// Which end of a new relationship the calling object sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindDirection {
    /// `self -> other`
    To,
    /// `other -> self`
    From,
}

impl std::str::FromStr for BindDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "to" => Ok(Self::To),
            "from" => Ok(Self::From),
            other => Err(Error::RelationshipDirection(other.to_string())),
        }
    }
}

/// The other end of a relationship
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// Looked up in the store before binding
    Id(NodeId),
    /// Used as is
    Node(&'a RawNode),
}

impl NodeRef<'_> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Id(id) => *id,
            NodeRef::Node(node) => node.id,
        }
    }
}

impl From<NodeId> for NodeRef<'_> {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

impl From<u64> for NodeRef<'_> {
    fn from(id: u64) -> Self {
        NodeRef::Id(NodeId(id))
    }
}

impl<'a> From<&'a RawNode> for NodeRef<'a> {
    fn from(node: &'a RawNode) -> Self {
        NodeRef::Node(node)
    }
}

impl<'a, S> From<&'a MappedObject<S>> for NodeRef<'a> {
    fn from(obj: &'a MappedObject<S>) -> Self {
        NodeRef::Node(obj.node())
    }
}

impl<S: GraphStore> MappedObject<S> {
    /// Create a relationship between this object and `other`
    ///
    /// `direction` must be `"to"` (`self -> other`) or `"from"`
    /// (`other -> self`); anything else fails before the store is touched.
    pub async fn bind<'a>(
        &self,
        direction: &str,
        other: impl Into<NodeRef<'a>>,
        rel_type: &str,
        data: PropertyMap,
    ) -> Result<Relationship> {
        let direction: BindDirection = direction.parse()?;
        let other = self.resolve(other.into()).await?;

        let (start, end) = match direction {
            BindDirection::To => (self.id(), other),
            BindDirection::From => (other, self.id()),
        };
        let relationship = self
            .mapper
            .store()
            .create_relationship(start, end, rel_type, encode_map(&data))
            .await
            .map_err(|e| Error::store("create_relationship", e))?;
        tracing::debug!("Bound {} -[{}]-> {}", start, rel_type, end);
        Ok(relationship)
    }

    /// Delete relationships between this object and `other` in either
    /// orientation, restricted to `rel_type` when given
    pub async fn sever<'a>(&self, other: impl Into<NodeRef<'a>>, rel_type: Option<&str>) -> Result<()> {
        let query = NavigationCompiler::compile_sever(rel_type)?;
        let other = other.into().id();
        self.mapper
            .store()
            .query(query.text(), &CompiledQuery::sever_params(self.id(), other))
            .await
            .map_err(|e| Error::store("query", e))?;
        tracing::debug!("Severed {} from {}", self.id(), other);
        Ok(())
    }

    async fn resolve(&self, other: NodeRef<'_>) -> Result<NodeId> {
        match other {
            NodeRef::Node(node) => Ok(node.id),
            NodeRef::Id(id) => self
                .mapper
                .store()
                .get_node(id)
                .await
                .map_err(|e| Error::store("get_node", e))?
                .map(|node| node.id)
                .ok_or_else(|| Error::not_found(format!("node {}", id))),
        }
    }
}
