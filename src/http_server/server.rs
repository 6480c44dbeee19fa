//! # HTTP Server
//!
//! axum server hosting one [`Application`]. Request spans come from
//! tower-http's `TraceLayer`.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::Application;
use crate::config::{AeroRestConfig, ConfigResult};

use super::handler::handle_request;

/// HTTP server for a REST application
pub struct HttpServer {
    addr: String,
    app: Arc<Application>,
    router: Router,
}

impl HttpServer {
    /// Serve `app` on `addr`
    pub fn new(app: Arc<Application>, addr: impl Into<String>) -> Self {
        let router = Self::build_router(Arc::clone(&app));
        Self {
            addr: addr.into(),
            app,
            router,
        }
    }

    /// Bootstrap the application from configuration
    pub fn from_config(config: &AeroRestConfig) -> ConfigResult<Self> {
        let app = Application::from_config(config)?;
        Ok(Self::new(Arc::new(app), config.socket_addr()))
    }

    /// Router with the single fallback handler
    pub fn build_router(app: Arc<Application>) -> Router {
        Router::new()
            .fallback(handle_request)
            .with_state(app)
            .layer(TraceLayer::new_for_http())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> &str {
        &self.addr
    }

    pub fn app(&self) -> &Arc<Application> {
        &self.app
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process ends
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}: {}", self.addr, e)))?;

        // Build the table before the first request arrives.
        let rules = self.app.route_table().len();
        info!(%addr, rules, "aerorest listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_from_default_config() {
        let server = HttpServer::from_config(&AeroRestConfig::default()).unwrap();
        assert_eq!(server.socket_addr(), "0.0.0.0:54321");
        assert!(server.app().route_table().is_empty());
    }

    #[tokio::test]
    async fn test_bad_address() {
        let app = Arc::new(Application::from_config(&AeroRestConfig::default()).unwrap());
        let err = HttpServer::new(app, "not an address").start().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
