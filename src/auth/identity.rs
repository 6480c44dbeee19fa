//! # Identity
//!
//! The authenticated principal attached to a request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier (user ID, service name)
    pub id: String,

    /// Roles used by route-level access rules
    #[serde(default)]
    pub roles: Vec<String>,

    /// Extra claims carried by the credential
    #[serde(default)]
    pub claims: Map<String, Value>,
}

impl Identity {
    /// Identity with no roles or claims
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
            claims: Map::new(),
        }
    }

    /// Add a role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Add a claim
    pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }

    /// Whether this identity holds a role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
