//! Format Negotiation
//!
//! Picks plain JSON or the callback-wrapped format. `application/jsonp` in
//! `Accept` always selects the callback format; otherwise a `callback`
//! query parameter selects it for JSON requests.

use crate::errors::ApiResult;

use super::context::AccessContext;
use super::request::ApiRequest;
use super::response::ActionResult;
use super::stage::{Next, Stage};

/// Query parameter naming the callback
pub const CALLBACK_PARAM: &str = "callback";

/// Response format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    /// Body wrapped as `{"callback": name, "data": body}`
    Jsonp,
}

/// Select the response format for a request
pub fn negotiate(request: &ApiRequest) -> ResponseFormat {
    let accept = request.header("accept").unwrap_or("").to_ascii_lowercase();
    if accept.contains("application/jsonp") {
        return ResponseFormat::Jsonp;
    }

    let wants_json = accept.is_empty()
        || accept.contains("application/json")
        || accept.contains("*/*");
    if wants_json && request.query_param(CALLBACK_PARAM).is_some() {
        ResponseFormat::Jsonp
    } else {
        ResponseFormat::Json
    }
}

/// Negotiate-format stage
pub struct NegotiateFormat;

impl Stage for NegotiateFormat {
    fn name(&self) -> &'static str {
        "negotiate-format"
    }

    fn process(&self, ctx: &mut AccessContext, next: Next<'_>) -> ApiResult<ActionResult> {
        ctx.format = negotiate(&ctx.request);
        next.run(ctx)
    }
}
