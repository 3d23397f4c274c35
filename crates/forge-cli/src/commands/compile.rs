//! Navigation compile command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use forge_core::{CompiledQuery, NavigationCompiler, PathExpression};
use serde_json::json;

use crate::output::{print_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct CompileArgs {
    /// Entity declaring the navigation
    #[arg(required_unless_present_any = ["path", "sever"])]
    pub entity: Option<String>,

    /// Navigation name
    #[arg(required_unless_present_any = ["path", "sever"])]
    pub navigation: Option<String>,

    /// Compile an ad-hoc path instead, e.g. "Person [KNOWS] Person"
    #[arg(long, conflicts_with_all = ["entity", "navigation", "sever"])]
    pub path: Option<String>,

    /// WHERE predicate over the path placeholders, e.g. "c.age > 30"
    #[arg(short = 'w', long = "where")]
    pub filter: Option<String>,

    /// Compile a sever query instead; takes an optional relationship type
    #[arg(long, num_args = 0..=1, default_missing_value = "", conflicts_with_all = ["entity", "navigation"])]
    pub sever: Option<String>,

    /// Schema file (defaults to the configured schema)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Also print placeholder bindings
    #[arg(short, long)]
    pub bindings: bool,
}

fn compile(args: &CompileArgs) -> anyhow::Result<CompiledQuery> {
    if let Some(rel_type) = &args.sever {
        let rel_type = Some(rel_type.as_str()).filter(|t| !t.is_empty());
        return Ok(NavigationCompiler::compile_sever(rel_type)?);
    }

    let path = match &args.path {
        Some(text) => PathExpression::parse(text)?,
        None => {
            let entity = args.entity.as_deref().context("missing entity")?;
            let navigation = args.navigation.as_deref().context("missing navigation")?;
            super::load_schema(args.schema.as_deref())?
                .navigation(entity, navigation)?
                .clone()
        }
    };
    Ok(NavigationCompiler::compile(&path, args.filter.as_deref())?)
}

pub fn run(args: &CompileArgs, cli: &Cli) -> anyhow::Result<()> {
    let query = compile(args)?;

    match cli.format {
        OutputFormat::Json => {
            let bindings: Vec<_> = query
                .bindings()
                .iter()
                .map(|b| json!({ "variable": b.variable, "token": b.token.to_string() }))
                .collect();
            print_json(&json!({
                "text": query.text(),
                "bindings": bindings,
                "terminal": query.terminal_variable(),
                "terminal_entity": query.terminal_entity(),
            }))?;
        }
        OutputFormat::Text => {
            println!("{}", query.text());
            if args.bindings {
                println!();
                for binding in query.bindings() {
                    println!("{} = {}", binding.variable, binding.token);
                }
            }
        }
    }
    Ok(())
}
