// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vaultship")]
#[command(about = "Idempotent secure-configuration and deployment for a single-host AI stack")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// JSON-lines output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a vaultship.yml manifest with the built-in service catalog
    Init {
        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Configure, encrypt, and deploy services
    Deploy {
        /// Deploy a single service instead of the whole catalog
        #[arg(short, long)]
        service: Option<String>,
    },

    /// Unattended startup: keep encrypted files sealed, leave running containers alone
    Boot,

    /// Show configuration and container state per service
    Status,

    /// Materialize prerequisite files from object storage
    Fetch,
}
