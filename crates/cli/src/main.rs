//! TeamHub MCP Supervisor CLI
//!
//! A command-line tool for inspecting tenant tool-server containers,
//! managing MCP tool installs, and controlling the resource monitor.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{mcps, monitor, summary};

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// TeamHub MCP Supervisor CLI
#[derive(Parser)]
#[command(name = "tms")]
#[command(author, version, about = "CLI for the TeamHub MCP supervisor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via TMS_API_URL env var)
    #[arg(long, env = "TMS_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show tenant container summaries
    Summary {
        /// Organization to summarize (all tenants when omitted)
        organization: Option<String>,
    },

    /// Show current resource usage for one tenant
    Usage {
        /// Organization identifier
        organization: String,
    },

    /// Manage MCP tool installs
    #[command(subcommand)]
    Mcps(McpsCommands),

    /// Control the background resource monitor
    #[command(subcommand)]
    Monitor(MonitorCommands),

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum McpsCommands {
    /// List installed MCP tools for a tenant
    List {
        /// Organization identifier
        organization: String,
    },

    /// Install an MCP tool into a tenant's container
    Install {
        /// Organization identifier
        organization: String,

        /// Tool name
        #[arg(long)]
        name: String,

        /// Command the tool server runs
        #[arg(long)]
        command: String,

        /// Argument passed to the command (repeatable)
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Environment variable as KEY=VALUE (repeatable)
        #[arg(long = "env")]
        env: Vec<String>,

        /// Tool version
        #[arg(long)]
        version: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum MonitorCommands {
    /// Show whether the monitor is running
    Status,

    /// Start the background monitor
    Start,

    /// Stop the background monitor
    Stop,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the stored and resolved configuration
    Show,

    /// Set the default API endpoint URL
    SetUrl {
        /// API endpoint URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = config::Config::load().unwrap_or_else(|e| {
        output::print_warning(&format!("Ignoring config file: {:#}", e));
        config::Config::default()
    });

    // Flag and env var win over the config file
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| file_config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    if cli.verbose {
        output::print_info(&format!("Using API at {}", api_url));
    }

    match cli.command {
        Commands::Summary { organization } => {
            let client = client::ApiClient::new(&api_url)?;
            match organization {
                Some(org) => summary::show_summary(&client, &org, cli.format).await?,
                None => summary::show_fleet(&client, cli.format).await?,
            }
        }
        Commands::Usage { organization } => {
            let client = client::ApiClient::new(&api_url)?;
            summary::show_usage(&client, &organization, cli.format).await?;
        }
        Commands::Mcps(mcps_cmd) => {
            let client = client::ApiClient::new(&api_url)?;
            match mcps_cmd {
                McpsCommands::List { organization } => {
                    mcps::list_mcps(&client, &organization, cli.format).await?;
                }
                McpsCommands::Install {
                    organization,
                    name,
                    command,
                    args,
                    env,
                    version,
                } => {
                    let options = mcps::InstallOptions {
                        name,
                        command,
                        args,
                        env_pairs: env,
                        version,
                    };
                    mcps::install_mcp(&client, &organization, options, cli.format).await?;
                }
            }
        }
        Commands::Monitor(monitor_cmd) => {
            let client = client::ApiClient::new(&api_url)?;
            match monitor_cmd {
                MonitorCommands::Status => monitor::show_status(&client, cli.format).await?,
                MonitorCommands::Start => monitor::start(&client, cli.format).await?,
                MonitorCommands::Stop => monitor::stop(&client, cli.format).await?,
            }
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => config::show_config(&file_config, &api_url, cli.format)?,
            ConfigCommands::SetUrl { url } => config::set_api_url(&url)?,
        },
    }

    Ok(())
}
