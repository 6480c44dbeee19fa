//! Post-Processing
//!
//! Runs on every outcome, success or error: callback wrapping for the
//! negotiated callback format, the JSON content type, and CORS headers.

use serde_json::{json, Value};
use tracing::{debug, error};

use crate::errors::{ApiError, ApiResult, ErrorBody};

use super::negotiate::{ResponseFormat, CALLBACK_PARAM};
use super::request::ApiRequest;
use super::response::{ActionResult, ApiResponse, ResponseHeaders};

/// Content type of every response with a body
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Wrap a result for the callback format
pub fn wrap_callback(data: Value, callback: &str) -> Value {
    json!({
        "callback": callback,
        "data": data,
    })
}

/// Turn an error into its response
pub fn error_response(err: &ApiError) -> ApiResponse {
    if err.is_client_error() {
        debug!(status = err.status_code().as_u16(), error = %err, "request rejected");
    } else {
        error!(status = err.status_code().as_u16(), error = %err, "request failed");
    }

    let mut headers = ResponseHeaders::new();
    for (name, value) in err.headers() {
        headers.set(name, value);
    }
    let body = serde_json::to_value(ErrorBody::from(err)).unwrap_or(Value::Null);

    ApiResponse {
        status: err.status_code(),
        headers,
        body: Some(body),
    }
}

/// Inject CORS headers.
///
/// `Access-Control-Expose-Headers` lists the header names present before
/// injection, in insertion order. `Access-Control-Allow-Origin` reflects the
/// request's `Origin` and is left out when there is none.
pub fn apply_cors(headers: &mut ResponseHeaders, request: &ApiRequest) {
    let exposed = headers.names().join(",");

    headers.set("Access-Control-Allow-Credentials", "true");
    if let Some(origin) = request.origin() {
        headers.set("Access-Control-Allow-Origin", origin);
    }
    headers.set("Access-Control-Allow-Headers", "Authorization");
    headers.set("Access-Control-Expose-Headers", exposed);
}

/// Build the final response from a pipeline outcome
pub fn finalize(result: ApiResult<ActionResult>, request: &ApiRequest, format: ResponseFormat) -> ApiResponse {
    let mut response = match result {
        Ok(mut result) => {
            if format == ResponseFormat::Jsonp {
                if let Some(callback) = request.query_param(CALLBACK_PARAM) {
                    result.body = result.body.take().map(|body| wrap_callback(body, callback));
                }
            }
            ApiResponse::from(result)
        }
        Err(err) => error_response(&err),
    };

    if response.body.is_some() {
        response.headers.set("Content-Type", JSON_CONTENT_TYPE);
    }
    apply_cors(&mut response.headers, request);
    response
}
