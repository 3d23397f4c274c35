//! `forge config`: read and edit the CLI config file

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};
use crate::output::{print_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// Key, e.g. engine.default_mode
        key: String,
    },
    /// Change one value
    Set { key: String, value: String },
    /// Reset one value to its default
    Unset { key: String },
    /// Print every key
    List,
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
        /// Default schema to record
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

fn known(key: &str) -> anyhow::Result<()> {
    if Config::keys().contains(&key) {
        Ok(())
    } else {
        anyhow::bail!(
            "Unknown config key: {} (available: {})",
            key,
            Config::keys().join(", ")
        )
    }
}

pub fn run(args: &ConfigArgs, cli: &Cli) -> anyhow::Result<()> {
    let path = config_file_path();

    match &args.command {
        ConfigCommands::Get { key } => {
            known(key)?;
            let value = Config::load().get(key);
            println!("{}", value.as_deref().unwrap_or("(not set)"));
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load();
            let before = config.get(key);
            config.set(key, value)?;
            config.save()?;
            tracing::info!("Config {} changed from {:?} to {}", key, before, value);
            if !cli.quiet {
                println!("{} = {}", key, value);
            }
        }
        ConfigCommands::Unset { key } => {
            known(key)?;
            let mut config = Config::load();
            let defaults = Config::default();
            match defaults.get(key) {
                Some(value) => config.set(key, &value)?,
                None => config.schema = None,
            }
            config.save()?;
            if !cli.quiet {
                println!("{} reset", key);
            }
        }
        ConfigCommands::List => {
            let config = Config::load();
            let values: BTreeMap<&str, Option<String>> =
                Config::keys().iter().map(|k| (*k, config.get(k))).collect();
            match cli.format {
                OutputFormat::Json => print_json(&values)?,
                OutputFormat::Text => {
                    println!("# {}", path.display());
                    for (key, value) in values {
                        println!("{} = {}", key, value.as_deref().unwrap_or("(not set)"));
                    }
                }
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force, schema } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            let config = Config {
                schema: schema.clone(),
                ..Config::default()
            };
            config.save()?;
            println!("Created config file at {}", path.display());
        }
    }
    Ok(())
}
