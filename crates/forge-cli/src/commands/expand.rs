//! Id range expansion command

use clap::Args;
use forge_core::expand_range;

use crate::config::Config;
use crate::output::{print_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct ExpandArgs {
    /// Inclusive range, e.g. 5-8
    pub range: String,

    /// Largest span to expand (defaults to engine.max_range_span)
    #[arg(long)]
    pub max_span: Option<u64>,
}

pub fn run(args: &ExpandArgs, cli: &Cli) -> anyhow::Result<()> {
    let max_span = args
        .max_span
        .unwrap_or_else(|| Config::load().engine.max_range_span);
    let ids: Vec<u64> = expand_range(&args.range, max_span)?
        .into_iter()
        .map(|id| id.0)
        .collect();
    tracing::debug!("Expanded {} into {} ids", args.range, ids.len());

    match cli.format {
        OutputFormat::Json => print_json(&ids)?,
        OutputFormat::Text => {
            for id in ids {
                println!("{}", id);
            }
        }
    }
    Ok(())
}
