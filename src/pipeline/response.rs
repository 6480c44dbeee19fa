//! # API Response
//!
//! Outgoing response model. Header names keep their case and insertion
//! order so that the CORS expose list mirrors exactly what was set.

use axum::http::StatusCode;
use serde_json::Value;

/// Ordered, case-preserving response header list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, String)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing one with the same name
    /// (case-insensitive) in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Header value by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Header names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of running an action, before post-processing
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub status: StatusCode,
    pub headers: ResponseHeaders,
    pub body: Option<Value>,
}

impl ActionResult {
    /// 200 with a body
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: ResponseHeaders::new(),
            body: Some(body),
        }
    }

    /// 201 with the created record
    pub fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(body)
        }
    }

    /// 204 with no body
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: ResponseHeaders::new(),
            body: None,
        }
    }

    /// 200 with no body
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            headers: ResponseHeaders::new(),
            body: None,
        }
    }

    /// Add a response header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }
}

/// Final response handed to the HTTP layer
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: ResponseHeaders,
    pub body: Option<Value>,
}

impl From<ActionResult> for ApiResponse {
    fn from(result: ActionResult) -> Self {
        Self {
            status: result.status,
            headers: result.headers,
            body: result.body,
        }
    }
}
