//! Schema check command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::output::{print_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct CheckArgs {
    /// Schema file (defaults to the configured schema)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
}

#[derive(Serialize)]
struct CheckedNavigation {
    entity: String,
    navigation: String,
    terminal: Option<String>,
    query: String,
}

pub fn run(args: &CheckArgs, cli: &Cli) -> anyhow::Result<()> {
    let registry = super::load_schema(args.schema.as_deref())?;
    let compiled = registry.check()?;
    tracing::info!(
        "Checked {} entities, {} navigations",
        registry.len(),
        compiled.len()
    );

    let checked: Vec<CheckedNavigation> = compiled
        .into_iter()
        .map(|(entity, navigation, query)| CheckedNavigation {
            terminal: query.terminal_entity().map(str::to_string),
            query: query.text().to_string(),
            entity,
            navigation,
        })
        .collect();

    match cli.format {
        OutputFormat::Json => print_json(&checked)?,
        OutputFormat::Text => {
            for entry in registry.entities() {
                let required: Vec<_> = entry.required_fields.iter().map(String::as_str).collect();
                println!("{} (required: {})", entry.name, required.join(", "));
            }
            for nav in &checked {
                println!();
                println!(
                    "{}.{} -> {}",
                    nav.entity,
                    nav.navigation,
                    nav.terminal.as_deref().unwrap_or("?")
                );
                for line in nav.query.lines() {
                    println!("  {}", line);
                }
            }
            if !cli.quiet {
                println!();
                println!(
                    "OK: {} entities, {} navigations",
                    registry.len(),
                    checked.len()
                );
            }
        }
    }
    Ok(())
}
