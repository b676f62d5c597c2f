//! # Command Line Interface
//!
//! This module provides CLI commands for building, validating, and
//! rendering the private topology. The CLI is the one-shot entry point:
//! it loads settings, constructs the topology, and emits the
//! materialization plan for the external provisioning engine.

use crate::config::AppConfig;
use crate::observability::{init_tracing, log_config_info};
use crate::topology::Topology;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "gangway")]
#[command(about = "Private-topology provisioning core")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (overrides GANGWAY_CONFIG_FILE)
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the topology and emit the dependency-ordered plan
    Plan {
        /// Write the plan here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Build and validate the topology without emitting a plan
    Validate,

    /// Render the full topology description
    Render {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        std::env::set_var("GANGWAY_CONFIG_FILE", path);
    }

    let config = AppConfig::from_env()?;
    init_tracing(&config.observability)?;
    log_config_info(&config);

    match cli.command.unwrap_or(Commands::Plan { output: None, format: OutputFormat::Json }) {
        Commands::Plan { output, format } => {
            let topology = Topology::from_config(&config)?;
            let plan = topology.plan()?;
            let rendered = match format {
                OutputFormat::Json => plan.to_json()?,
                OutputFormat::Yaml => plan.to_yaml()?,
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    info!(path = %path.display(), steps = plan.len(), "Plan written");
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Validate => {
            let topology = Topology::from_config(&config)?;
            info!(
                subnets = topology.network.subnets.len(),
                rules = topology.load_balancer.listener.rule_count(),
                endpoints = topology.fabric.endpoints.len(),
                "Topology valid"
            );
        }
        Commands::Render { format } => {
            let topology = Topology::from_config(&config)?;
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&topology)?,
                OutputFormat::Yaml => serde_yaml::to_string(&topology)?,
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}
