//! Forge Engine - Graph-object mapping over a [`GraphStore`]
//!
//! [`Forge`] validates and creates objects, fetches nodes by id, index or
//! query, and maps them into [`MappedObject`]s. Mapped objects carry their
//! own navigation, mutation and relationship methods; [`BulkRunner`] drives
//! many operations at once and post-processes the results.
//!
//! [`GraphStore`]: forge_store::GraphStore

#![allow(clippy::result_large_err)]

pub mod bulk;
pub mod forge;
pub mod mapper;
pub mod navigation;
pub mod object;
pub mod options;
pub mod relationship;

#[cfg(test)]
mod test_support;

pub use bulk::{BatchResult, BulkOptions, BulkRunner};
pub use forge::Forge;
pub use mapper::NodeMapper;
pub use navigation::NavItem;
pub use object::MappedObject;
pub use options::{ExecutionMode, ForgeOptions};
pub use relationship::{BindDirection, NodeRef};
