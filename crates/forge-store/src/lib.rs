//! Forge Store - Graph store capability interface
//!
//! The mapping engine only needs a handful of node and relationship
//! operations from a graph database. This crate defines that interface and
//! ships an in-memory implementation that understands the query dialect the
//! navigation compiler emits.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod memory;
pub mod query;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::GraphStore;
