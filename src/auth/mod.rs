//! # Auth Module
//!
//! Identities, token validation and the authentication methods composed by
//! the pipeline's authenticate stage.

pub mod errors;
pub mod identity;
pub mod jwt;
pub mod methods;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use identity::Identity;
pub use jwt::{JwtClaims, JwtConfig, JwtValidator};
pub use methods::{AuthMethod, BearerTokenAuth, CompositeAuth, QueryParamTokenAuth, DEFAULT_TOKEN_PARAM};
pub use token::{ChainValidator, StaticTokenValidator, TokenValidator};
