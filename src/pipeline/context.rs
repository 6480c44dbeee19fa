//! Access Context
//!
//! Per-request state carried through every pipeline stage: the request,
//! the resolved route, the identity once authenticated, and the record once
//! resolved. Created per request and dropped with it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::Identity;
use crate::controller::{ActionBinding, Controller};
use crate::errors::{ApiError, ApiResult};

use super::negotiate::ResponseFormat;
use super::request::ApiRequest;

/// Context carried through the pipeline
pub struct AccessContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    pub request: ApiRequest,

    /// Fully qualified route target (`users/view`, `admin/default/list`)
    pub route: String,

    /// Controller owning the action
    pub controller: Arc<dyn Controller>,

    /// Action ID
    pub action: String,

    /// Route parameters merged over query parameters
    pub params: HashMap<String, String>,

    /// Set by the dispatch stage
    pub binding: Option<ActionBinding>,

    /// Set by the authenticate stage
    pub identity: Option<Identity>,

    /// Set by the access-check stage for record actions
    pub record: Option<Value>,

    /// Set by the negotiate stage
    pub format: ResponseFormat,

    started_at: Instant,
}

impl AccessContext {
    pub fn new(
        request: ApiRequest,
        route: impl Into<String>,
        controller: Arc<dyn Controller>,
        action: impl Into<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            request,
            route: route.into(),
            controller,
            action: action.into(),
            params,
            binding: None,
            identity: None,
            record: None,
            format: ResponseFormat::Json,
            started_at: Instant::now(),
        }
    }

    /// Parameter value (route first, then query)
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Request body as a JSON object
    pub fn body_object(&self) -> ApiResult<&Map<String, Value>> {
        self.request
            .body
            .as_ref()
            .and_then(Value::as_object)
            .ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}
