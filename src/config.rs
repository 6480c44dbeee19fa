//! # Configuration
//!
//! JSON configuration file: listener, URL rule, pagination bounds,
//! authentication, and the in-memory resources served by `aerorest serve`.
//! Every field has a default; `load` reads, parses and validates.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::auth::DEFAULT_TOKEN_PARAM;
use crate::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::store::DEFAULT_KEY_DELIMITER;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// A resource served from an in-memory store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// URL segment under the prefix (`users`)
    pub url: String,

    /// Controller ID (`user`)
    pub controller: String,

    /// Register the controller inside this module, as its default route
    #[serde(default)]
    pub module: Option<String>,

    /// Scalar attribute names, in order
    pub attributes: Vec<String>,

    /// Primary key attribute names (default: `["id"]`)
    #[serde(default = "default_primary_key")]
    pub primary_key: Vec<String>,

    /// Seed records
    #[serde(default)]
    pub records: Vec<Value>,

    /// Actions callable without an identity
    #[serde(default)]
    pub public: Vec<String>,

    /// Attribute holding the owner's identity ID; enables ownership
    /// scoping for list and record-level access checks
    #[serde(default)]
    pub owner_field: Option<String>,
}

/// A static API token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub identity: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AeroRestConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 54321)
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefix for every synthesized rule (default: "api")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Only synthesize rules for these actions, if non-empty
    #[serde(default)]
    pub only: Vec<String>,

    /// Never synthesize rules for these actions
    #[serde(default)]
    pub except: Vec<String>,

    /// Upper bound on `per-page` (default: 20000)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Page size when `per-page` is absent (default: 20)
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Composite-key delimiter in URLs (default: ",")
    #[serde(default = "default_key_delimiter")]
    pub key_delimiter: String,

    /// OPTIONS requests skip authentication (default: true)
    #[serde(default = "default_true")]
    pub anonymous_options: bool,

    /// Query parameter for token authentication (default: "access-token")
    #[serde(default = "default_token_param")]
    pub token_query_param: String,

    /// HMAC secret for JWT bearer tokens; JWT auth is off without it
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_jwt_claim")]
    pub jwt_issuer: String,

    #[serde(default = "default_jwt_claim")]
    pub jwt_audience: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub tokens: Vec<TokenConfig>,

    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    54321
}

fn default_prefix() -> String {
    "api".to_string()
}

fn default_max_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_key_delimiter() -> String {
    DEFAULT_KEY_DELIMITER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_token_param() -> String {
    DEFAULT_TOKEN_PARAM.to_string()
}

fn default_jwt_claim() -> String {
    "aerorest".to_string()
}

fn default_primary_key() -> Vec<String> {
    vec!["id".to_string()]
}

impl Default for AeroRestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            prefix: default_prefix(),
            only: Vec::new(),
            except: Vec::new(),
            max_page_size: default_max_page_size(),
            default_page_size: default_page_size(),
            key_delimiter: default_key_delimiter(),
            anonymous_options: true,
            token_query_param: default_token_param(),
            jwt_secret: None,
            jwt_issuer: default_jwt_claim(),
            jwt_audience: default_jwt_claim(),
            log_format: LogFormat::default(),
            tokens: Vec::new(),
            resources: Vec::new(),
        }
    }
}

impl AeroRestConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AeroRestConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges and resource declarations
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be > 0".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be in [1, {}], got {}",
                self.max_page_size, self.default_page_size
            )));
        }
        if self.key_delimiter.is_empty() {
            return Err(ConfigError::Invalid("key_delimiter must not be empty".to_string()));
        }

        for resource in &self.resources {
            if resource.primary_key.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "resource '{}' has no primary key",
                    resource.url
                )));
            }
            if let Some(missing) = resource
                .primary_key
                .iter()
                .find(|pk| !resource.attributes.contains(pk))
            {
                return Err(ConfigError::Invalid(format!(
                    "resource '{}': primary key '{}' is not an attribute",
                    resource.url, missing
                )));
            }
        }
        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
