//! # API Errors
//!
//! Error taxonomy for the synthesized REST surface. Every variant maps to
//! exactly one outward-visible status code.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::{KeyError, StoreError};

/// Result type for pipeline and controller operations
pub type ApiResult<T> = Result<T, ApiError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed input (bad body, malformed key)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A declared action parameter was not supplied
    #[error("Missing required parameters: {0}")]
    MissingParam(String),

    /// No identity could be established for an action that needs one
    #[error("Your request was made with invalid credentials.")]
    Unauthorized {
        /// `WWW-Authenticate` challenge to send back, if any
        challenge: Option<String>,
    },

    /// Route-level or record-level access check rejected the request
    #[error("{0}")]
    Forbidden(String),

    /// Record or route not found
    #[error("{0}")]
    NotFound(String),

    /// The path exists but not for this HTTP method
    #[error("Method Not Allowed. This URL can only handle the following request methods: {}", join_methods(.0))]
    MethodNotAllowed(Vec<Method>),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Authentication failure without a challenge header
    pub fn unauthorized() -> Self {
        Self::Unauthorized { challenge: None }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::MissingParam(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short status name used in the error body
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::MissingParam(_) => "Bad Request",
            ApiError::Unauthorized { .. } => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "Not Found",
            ApiError::MethodNotAllowed(_) => "Method Not Allowed",
            ApiError::Store(_) | ApiError::Internal(_) => "Internal Server Error",
        }
    }

    /// Whether this error is the caller's fault
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Headers that must accompany the error response
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            ApiError::Unauthorized {
                challenge: Some(challenge),
            } => vec![("WWW-Authenticate", challenge.clone())],
            ApiError::MethodNotAllowed(methods) => vec![("Allow", join_methods(methods))],
            _ => Vec::new(),
        }
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::PartCount { .. } => ApiError::NotFound(format!("Object not found: {}", err)),
            KeyError::Empty | KeyError::NoPrimaryKey => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden(msg) => ApiError::Forbidden(msg),
            _ => ApiError::unauthorized(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
    pub code: u16,
    pub status: u16,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        // Server-side detail stays in the logs.
        let message = match err {
            ApiError::Store(_) | ApiError::Internal(_) => {
                "An internal server error occurred.".to_string()
            }
            _ => err.to_string(),
        };
        let status = err.status_code().as_u16();
        Self {
            name: err.name().to_string(),
            message,
            code: 0,
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody::from(&self));
        (status, body).into_response()
    }
}
