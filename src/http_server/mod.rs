//! HTTP Server Module
//!
//! The HTTP boundary: axum server and the request bridge into the
//! application.

mod handler;
mod server;

pub use handler::handle_request;
pub use server::HttpServer;
