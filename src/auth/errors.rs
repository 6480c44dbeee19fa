//! # Auth Errors
//!
//! Error types for token validation and identity checks.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Token Errors
    // ==================
    /// Token is not in the expected shape
    #[error("Malformed token")]
    MalformedToken,

    /// Token has expired
    #[error("Token expired")]
    TokenExpired,

    /// Token signature does not verify
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is well-formed but unknown to the validator
    #[error("Unknown token")]
    UnknownToken,

    /// Token could not be issued
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,

    // ==================
    // Authorization Errors
    // ==================
    /// Identity lacks the rights for this request
    #[error("{0}")]
    Forbidden(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedToken
            | AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::UnknownToken => 401,
            AuthError::Forbidden(_) => 403,
            AuthError::TokenGenerationFailed => 500,
        }
    }
}
