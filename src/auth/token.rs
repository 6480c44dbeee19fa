//! # Token Validation
//!
//! Pluggable credential checking. The REST layer never inspects tokens
//! itself; auth methods extract them from the request and hand them to a
//! `TokenValidator`.

use std::collections::HashMap;

use super::errors::{AuthError, AuthResult};
use super::identity::Identity;

/// Validates an access token and yields the identity it stands for
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> AuthResult<Identity>;
}

/// Fixed token table, for service credentials and tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token
    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Number of registered tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(&self, token: &str) -> AuthResult<Identity> {
        self.tokens.get(token).cloned().ok_or(AuthError::UnknownToken)
    }
}

/// Tries validators in order; the first success wins
pub struct ChainValidator {
    validators: Vec<Box<dyn TokenValidator>>,
}

impl ChainValidator {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    pub fn with(mut self, validator: impl TokenValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl Default for ChainValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenValidator for ChainValidator {
    fn validate(&self, token: &str) -> AuthResult<Identity> {
        let mut last = AuthError::UnknownToken;
        for validator in &self.validators {
            match validator.validate(token) {
                Ok(identity) => return Ok(identity),
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_validator() {
        let validator = StaticTokenValidator::new().with_token("t-1", Identity::new("alice"));

        assert_eq!(validator.validate("t-1").unwrap().id, "alice");
        assert_eq!(validator.validate("nope"), Err(AuthError::UnknownToken));
    }

    #[test]
    fn test_chain_validator() {
        let chain = ChainValidator::new()
            .with(StaticTokenValidator::new().with_token("a", Identity::new("first")))
            .with(StaticTokenValidator::new().with_token("b", Identity::new("second")));

        assert_eq!(chain.validate("b").unwrap().id, "second");
        assert!(chain.validate("c").is_err());
    }
}
