use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use crate::commands::CommandContext;
use anyhow::Result;
use securescope_core::AccessConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI for the SecureScope access-control demo
#[derive(Parser, Debug)]
#[command(name = "securescope", about = "SecureScope Access Management")]
pub struct Cli {
    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the simulated login latency
    #[arg(long)]
    pub no_delay: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands for securescope
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List users
    Users {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List groups with their permissions and members
    Groups {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the permission catalog by category
    Permissions {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Log in and test a single permission
    Check {
        email: String,
        password: String,
        permission: String,
    },

    /// Log in and show the dashboard and effective permissions
    Whoami { email: String, password: String },

    /// Interactive session reading commands from stdin
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = AccessConfig::resolve(cli.config)?;
    if cli.no_delay {
        config.login_delay_ms = 0;
    }

    let ctx = CommandContext::new(config);
    debug!(config = ?ctx.system.config(), "Configuration loaded");

    // Dispatch commands
    match cli.command {
        Commands::Users { json } => commands::listing::show_users(&ctx, json)?,
        Commands::Groups { json } => commands::listing::show_groups(&ctx, json)?,
        Commands::Permissions { json } => commands::listing::show_permissions(&ctx, json)?,
        Commands::Check { email, password, permission } => commands::session::check(&ctx, &email, &password, &permission).await?,
        Commands::Whoami { email, password } => commands::session::whoami(&ctx, &email, &password).await?,
        Commands::Shell => commands::shell::run_shell(&ctx).await?,
    }

    Ok(())
}
