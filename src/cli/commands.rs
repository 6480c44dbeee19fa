//! CLI command implementations

use std::path::Path;

use serde_json::{json, Value};

use crate::app::bootstrap::jwt_validator;
use crate::app::Application;
use crate::auth::Identity;
use crate::config::AeroRestConfig;
use crate::http_server::HttpServer;
use crate::routing::RouteTable;
use crate::telemetry::init_tracing;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Routes { config } => routes(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Token {
            config,
            subject,
            roles,
        } => token(&config, subject, roles),
    }
}

/// Route table as JSON rows, in match order
pub fn route_rows(table: &RouteTable) -> Value {
    Value::Array(
        table
            .rules()
            .iter()
            .map(|rule| {
                json!({
                    "verbs": rule.verbs().iter().map(|m| m.as_str()).collect::<Vec<_>>(),
                    "pattern": rule.template(),
                    "route": rule.route(),
                })
            })
            .collect(),
    )
}

/// Print the synthesized route table
pub fn routes(config_path: &Path) -> CliResult<()> {
    let config = AeroRestConfig::load(config_path)?;
    let app = Application::from_config(&config)?;
    write_response(route_rows(app.route_table()))
}

/// Serve the configured resources
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = AeroRestConfig::load(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }
    init_tracing(config.log_format);

    let server = HttpServer::from_config(&config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Issue a JWT for an identity
pub fn token(config_path: &Path, subject: String, roles: Vec<String>) -> CliResult<()> {
    let config = AeroRestConfig::load(config_path)?;
    let validator = jwt_validator(&config)
        .ok_or_else(|| CliError::config_error("jwt_secret is not configured"))?;

    let identity = roles
        .into_iter()
        .fold(Identity::new(subject), |identity, role| identity.with_role(role));
    let token = validator.issue(&identity)?;
    write_response(json!({ "token": token, "subject": identity.id }))
}
