//! Id selections for bulk fetches

use crate::error::{Error, Result};
use crate::node::NodeId;

/// Ids to fetch: an explicit list or an inclusive `"start-end"` range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSelection {
    List(Vec<NodeId>),
    Range(String),
}

impl IdSelection {
    /// Resolve into concrete ids, expanding ranges up to `max_span` ids
    pub fn resolve(&self, max_span: u64) -> Result<Vec<NodeId>> {
        match self {
            IdSelection::List(ids) => Ok(ids.clone()),
            IdSelection::Range(text) => expand_range(text, max_span),
        }
    }
}

impl From<Vec<NodeId>> for IdSelection {
    fn from(ids: Vec<NodeId>) -> Self {
        IdSelection::List(ids)
    }
}

impl From<Vec<u64>> for IdSelection {
    fn from(ids: Vec<u64>) -> Self {
        IdSelection::List(ids.into_iter().map(NodeId).collect())
    }
}

impl From<&str> for IdSelection {
    fn from(range: &str) -> Self {
        IdSelection::Range(range.to_string())
    }
}

/// Expand `"start-end"` into the inclusive id range
///
/// A reversed range yields no ids.
pub fn expand_range(text: &str, max_span: u64) -> Result<Vec<NodeId>> {
    let (start, end) = text
        .trim()
        .split_once('-')
        .ok_or_else(|| Error::InvalidRange(format!("expected 'start-end', got '{}'", text)))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u64>()
            .map_err(|e| Error::InvalidRange(format!("'{}' in '{}': {}", part.trim(), text, e)))
    };
    let (start, end) = (parse(start)?, parse(end)?);

    if start > end {
        return Ok(Vec::new());
    }
    // end - start is the span minus one and cannot overflow
    if end - start >= max_span {
        return Err(Error::InvalidRange(format!(
            "'{}' covers {} ids (max {})",
            text,
            u128::from(end - start) + 1,
            max_span
        )));
    }
    Ok((start..=end).map(NodeId).collect())
}
