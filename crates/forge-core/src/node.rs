//! Raw graph records as exchanged with the store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw property bag as held by the store. Values are JSON scalars; structured
/// values are kept as JSON text.
pub type PropertyBag = BTreeMap<String, serde_json::Value>;

/// Named query parameters
pub type Params = BTreeMap<String, serde_json::Value>;

/// Identity of a node in the graph store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a relationship in the graph store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub u64);

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node as returned by the store: identity plus raw property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl RawNode {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            properties: PropertyBag::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// A directed, typed edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub start: NodeId,
    pub end: NodeId,
    pub rel_type: String,
    #[serde(default)]
    pub data: PropertyBag,
}

impl Relationship {
    /// Whether this relationship connects the two nodes in either orientation
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}

/// One result row of a query, columns in projection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, RawNode)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, node: RawNode) {
        self.columns.push((column.into(), node));
    }

    pub fn with_column(mut self, column: impl Into<String>, node: RawNode) -> Self {
        self.push(column, node);
        self
    }

    pub fn get(&self, column: &str) -> Option<&RawNode> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, node)| node)
    }

    /// Take ownership of a column's node
    pub fn take(self, column: &str) -> Option<RawNode> {
        self.columns
            .into_iter()
            .find(|(name, _)| name == column)
            .map(|(_, node)| node)
    }

    pub fn first(&self) -> Option<&RawNode> {
        self.columns.first().map(|(_, node)| node)
    }

    pub fn into_first(self) -> Option<RawNode> {
        self.columns.into_iter().next().map(|(_, node)| node)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_columns_keep_projection_order() {
        let row = Row::new()
            .with_column("c", RawNode::new(3))
            .with_column("a", RawNode::new(1));

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["c", "a"]);
        assert_eq!(row.first().unwrap().id, NodeId(3));
        assert_eq!(row.get("a").unwrap().id, NodeId(1));
        assert!(row.get("b").is_none());
    }

    #[test]
    fn test_relationship_connects_either_way() {
        let rel = Relationship {
            id: RelationshipId(0),
            start: NodeId(1),
            end: NodeId(2),
            rel_type: "KNOWS".into(),
            data: PropertyBag::new(),
        };
        assert!(rel.connects(NodeId(2), NodeId(1)));
        assert!(!rel.connects(NodeId(1), NodeId(3)));
    }
}
