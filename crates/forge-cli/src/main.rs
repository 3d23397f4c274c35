//! Forge CLI - Command line interface for the graph-object mapper

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{check, compile, completions, expand, graph};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about = "Map graph nodes onto typed entities and compile navigations")]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a schema and compile every navigation it declares
    Check(check::CheckArgs),
    /// Compile a navigation into its traversal query
    Compile(compile::CompileArgs),
    /// Expand an inclusive id range such as 5-8
    Expand(expand::ExpandArgs),
    /// Load a graph file into memory and query it
    Graph(graph::GraphArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting forge CLI");

    match &cli.command {
        Commands::Check(args) => check::run(args, &cli)?,
        Commands::Compile(args) => compile::run(args, &cli)?,
        Commands::Expand(args) => expand::run(args, &cli)?,
        Commands::Graph(args) => graph::run(args, &cli).await?,
        Commands::Config(args) => commands::config::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
