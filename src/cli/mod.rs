//! CLI module for aerorest
//!
//! Provides command-line interface for:
//! - routes: Print the route table synthesized from a configuration
//! - serve: Serve the configured resources over HTTP
//! - token: Issue a JWT access token

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{route_rows, routes, run, run_command, serve, token};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
