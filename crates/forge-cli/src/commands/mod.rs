//! CLI command implementations

pub mod check;
pub mod compile;
pub mod completions;
pub mod config;
pub mod expand;
pub mod graph;

use std::path::{Path, PathBuf};

use anyhow::Context;
use forge_core::SchemaRegistry;

use crate::config::Config;

/// Load the schema at `explicit`, or the one named in the config file
pub fn load_schema(explicit: Option<&Path>) -> anyhow::Result<SchemaRegistry> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::load().schema.context(
            "No schema given. Pass --schema or run `forge config set schema <path>`",
        )?,
    };
    tracing::debug!("Loading schema from {}", path.display());
    Ok(SchemaRegistry::from_path(&path)?)
}
