//! Forge Core - Data model and query compiler for graph-object mapping
//!
//! This crate holds everything that does not talk to a store: raw node
//! records, the property value codec, entity schemas, required-field
//! validation, the navigation compiler and the set pipeline.

pub mod compiler;
pub mod error;
pub mod ids;
pub mod limits;
pub mod node;
pub mod path;
pub mod pipeline;
pub mod schema;
pub mod validate;
pub mod value;

pub use compiler::{Binding, CompiledQuery, NavigationCompiler};
pub use error::{Error, Result};
pub use ids::{expand_range, IdSelection};
pub use node::{NodeId, Params, PropertyBag, RawNode, Relationship, RelationshipId, Row};
pub use path::{PathExpression, PathSpec, Token, TokenKind, TokenSpec};
pub use pipeline::{Properties, SetOptions, SetResult, SortDirection};
pub use schema::{SchemaEntry, SchemaRegistry};
pub use validate::validate;
pub use value::{PropertyMap, Value};
