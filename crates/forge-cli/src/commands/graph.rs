//! Graph commands over an in-memory store loaded from a TOML file
//!
//! ```toml
//! [[node]]
//! key = "ada"
//! entity = "Person"
//! properties = { name = "Ada", age = 36 }
//!
//! [[edge]]
//! from = "ada"
//! to = "bob"
//! type = "KNOWS"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use forge_core::{IdSelection, PropertyMap, SetOptions, SetResult, Value};
use forge_engine::{BulkOptions, ExecutionMode, Forge, MappedObject, NavItem};
use forge_store::MemoryStore;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::output::{print_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct GraphArgs {
    /// Graph file to load
    #[arg(short, long)]
    pub data: PathBuf,

    /// Schema file (defaults to the configured schema)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: GraphCommands,
}

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Follow a navigation from a node
    Navigate {
        /// Key of the starting node in the graph file
        node: String,
        /// Navigation name
        navigation: String,
        /// WHERE predicate over the path placeholders
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,
    },
    /// Fetch nodes as an entity and post-process them
    List {
        /// Entity to map the nodes as
        entity: String,
        /// Ids to fetch, e.g. 1-10 (defaults to the entity's nodes)
        #[arg(long)]
        ids: Option<String>,
        /// Sort by property
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        #[arg(long)]
        skip: Option<usize>,
        #[arg(long)]
        take: Option<usize>,
        /// Truncate the result; overrides --skip/--take
        #[arg(short, long)]
        limit: Option<usize>,
        /// Group the result into pages of this size
        #[arg(long)]
        paginate: Option<usize>,
        /// Execution mode (defaults to engine.default_mode)
        #[arg(long)]
        mode: Option<ExecutionMode>,
    },
}

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    node: Vec<NodeDef>,
    #[serde(default)]
    edge: Vec<EdgeDef>,
}

#[derive(Debug, Deserialize)]
struct NodeDef {
    key: String,
    entity: String,
    #[serde(default)]
    properties: toml::Table,
}

#[derive(Debug, Deserialize)]
struct EdgeDef {
    from: String,
    to: String,
    #[serde(rename = "type")]
    rel_type: String,
    #[serde(default)]
    data: toml::Table,
}

#[derive(Clone, Serialize)]
struct ObjectView<'a> {
    entity: Option<&'a str>,
    id: u64,
    properties: serde_json::Value,
}

fn to_properties(table: &toml::Table) -> anyhow::Result<PropertyMap> {
    let json = serde_json::to_value(table)?;
    let map = match json {
        serde_json::Value::Object(map) => map,
        _ => anyhow::bail!("properties must be a table"),
    };
    Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

/// Create every node and edge of the graph file, in file order
async fn load_graph(
    forge: &Forge<MemoryStore>,
    path: &Path,
) -> anyhow::Result<BTreeMap<String, MappedObject<MemoryStore>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file {}", path.display()))?;
    let file: GraphFile = toml::from_str(&text)
        .with_context(|| format!("Invalid graph file {}", path.display()))?;

    let mut objects = BTreeMap::new();
    for def in file.node {
        let object = forge
            .create(&def.entity, to_properties(&def.properties)?)
            .await
            .with_context(|| format!("Failed to create node '{}'", def.key))?;
        if objects.insert(def.key.clone(), object).is_some() {
            anyhow::bail!("Duplicate node key '{}'", def.key);
        }
    }

    for edge in &file.edge {
        let from = objects
            .get(&edge.from)
            .with_context(|| format!("Unknown node key '{}'", edge.from))?;
        let to = objects
            .get(&edge.to)
            .with_context(|| format!("Unknown node key '{}'", edge.to))?;
        from.bind("to", to, &edge.rel_type, to_properties(&edge.data)?)
            .await?;
    }

    tracing::info!(
        "Loaded {} nodes and {} edges from {}",
        objects.len(),
        file.edge.len(),
        path.display()
    );
    Ok(objects)
}

fn mapped_view(obj: &MappedObject<MemoryStore>) -> anyhow::Result<ObjectView<'_>> {
    Ok(ObjectView {
        entity: Some(obj.entity()),
        id: obj.id().0,
        properties: serde_json::to_value(obj.properties())?,
    })
}

fn nav_view(item: &NavItem<MemoryStore>) -> anyhow::Result<ObjectView<'_>> {
    match item {
        NavItem::Mapped(obj) => mapped_view(obj),
        NavItem::Raw(node) => Ok(ObjectView {
            entity: None,
            id: node.id.0,
            properties: serde_json::to_value(&node.properties)?,
        }),
    }
}

fn print_views(views: &[ObjectView<'_>]) {
    for view in views {
        println!(
            "#{} {} {}",
            view.id,
            view.entity.unwrap_or("(raw)"),
            view.properties
        );
    }
}

pub async fn run(args: &GraphArgs, cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load();
    let registry = super::load_schema(args.schema.as_deref())?;
    let forge = Forge::new(MemoryStore::new(), registry).with_options(config.engine);
    let objects = load_graph(&forge, &args.data).await?;

    match &args.command {
        GraphCommands::Navigate {
            node,
            navigation,
            filter,
        } => {
            let start = objects
                .get(node)
                .with_context(|| format!("Unknown node key '{}'", node))?;
            let items = start.navigate_where(navigation, filter.as_deref()).await?;
            tracing::info!("Navigation {} returned {} nodes", navigation, items.len());

            let views = items.iter().map(nav_view).collect::<anyhow::Result<Vec<_>>>()?;
            match cli.format {
                OutputFormat::Json => print_json(&views)?,
                OutputFormat::Text => print_views(&views),
            }
        }
        GraphCommands::List {
            entity,
            ids,
            sort,
            desc,
            skip,
            take,
            limit,
            paginate,
            mode,
        } => {
            let selection = match ids {
                Some(range) => IdSelection::from(range.as_str()),
                None => IdSelection::List(
                    objects
                        .values()
                        .filter(|o| o.entity() == entity.as_str())
                        .map(|o| o.id())
                        .collect(),
                ),
            };

            let mut set = SetOptions::new();
            set.sort = sort.clone();
            if *desc {
                set = set.descending();
            }
            set.skip = *skip;
            set.take = *take;
            set.limit = *limit;
            set.paginate = *paginate;

            let options = BulkOptions {
                mode: *mode,
                set,
            };
            let batch = forge
                .bulk()
                .fetch_many_by_ids(entity, selection, options)
                .await?;
            if let Some(err) = &batch.error {
                tracing::warn!("{}", err);
            }

            let pages = match &batch.items {
                SetResult::Flat(items) => vec![items.iter().collect::<Vec<_>>()],
                SetResult::Pages(pages) => pages.iter().map(|p| p.iter().collect()).collect(),
            };
            let views = pages
                .iter()
                .map(|page| page.iter().copied().map(mapped_view).collect::<anyhow::Result<Vec<_>>>())
                .collect::<anyhow::Result<Vec<_>>>()?;

            match (cli.format, batch.items.is_paginated()) {
                (OutputFormat::Json, true) => print_json(&views)?,
                (OutputFormat::Json, false) => print_json(&views.concat())?,
                (OutputFormat::Text, paginated) => {
                    for (i, page) in views.iter().enumerate() {
                        if paginated {
                            println!("-- page {} --", i + 1);
                        }
                        print_views(page);
                    }
                }
            }

            if let Some(err) = batch.error {
                return Err(err.into());
            }
        }
    }
    Ok(())
}
