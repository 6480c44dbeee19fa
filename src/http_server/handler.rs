//! HTTP ⇄ pipeline bridge
//!
//! One fallback handler serves every path: the application's route table,
//! not axum's router, decides what matches.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::warn;

use crate::app::Application;
use crate::errors::ApiError;
use crate::pipeline::{finalize, negotiate, ApiRequest, ApiResponse};

/// Fallback handler for all requests
pub async fn handle_request(
    State(app): State<Arc<Application>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: Option<Query<HashMap<String, String>>>,
    body: Bytes,
) -> Response {
    let mut request = ApiRequest::new(method, uri.path());
    request.headers = headers;
    if let Some(Query(query)) = query {
        request.query = query;
    }

    if !body.is_empty() {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => request.body = Some(value),
            Err(e) => {
                let format = negotiate(&request);
                let err = ApiError::bad_request(format!("Invalid JSON body: {}", e));
                return finalize(Err(err), &request, format).into_response();
            }
        }
    }

    app.handle(request).into_response()
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let body = match &self.body {
            Some(value) => match serde_json::to_vec(value) {
                Ok(bytes) => Body::from(bytes),
                Err(e) => {
                    warn!(error = %e, "response body serialization failed");
                    return ApiError::Internal(e.to_string()).into_response();
                }
            },
            None => Body::empty(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        for (name, value) in self.headers.iter() {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = name, "dropping invalid response header"),
            }
        }
        response
    }
}
