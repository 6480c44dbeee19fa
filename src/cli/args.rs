//! CLI argument definitions using clap
//!
//! Commands:
//! - aerorest routes --config <path>
//! - aerorest serve --config <path> [--port <port>]
//! - aerorest token --config <path> --subject <id> [--role <role>...]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aerorest - synthesized REST routing over typed record stores
#[derive(Parser, Debug)]
#[command(name = "aerorest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the synthesized route table
    Routes {
        /// Path to configuration file
        #[arg(long, default_value = "./aerorest.json")]
        config: PathBuf,
    },

    /// Serve the configured resources over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./aerorest.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Issue a JWT access token (requires `jwt_secret`)
    Token {
        /// Path to configuration file
        #[arg(long, default_value = "./aerorest.json")]
        config: PathBuf,

        /// Identity ID placed in the `sub` claim
        #[arg(long)]
        subject: String,

        /// Role to grant; repeatable
        #[arg(long = "role")]
        roles: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
