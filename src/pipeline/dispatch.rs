//! Dispatch Stage
//!
//! Resolves the action ID to the controller's binding and checks that every
//! required parameter is present.

use crate::errors::{ApiError, ApiResult};

use super::context::AccessContext;
use super::response::ActionResult;
use super::stage::{Next, Stage};

/// Dispatch-operation stage
pub struct Dispatch;

impl Stage for Dispatch {
    fn name(&self) -> &'static str {
        "dispatch"
    }

    fn process(&self, ctx: &mut AccessContext, next: Next<'_>) -> ApiResult<ActionResult> {
        let binding = ctx.controller.binding(&ctx.action).ok_or_else(|| {
            ApiError::not_found(format!("Unable to resolve the request \"{}\".", ctx.route))
        })?;

        let missing = binding.missing_params(|name| ctx.params.contains_key(name));
        if !missing.is_empty() {
            return Err(ApiError::MissingParam(missing.join(", ")));
        }

        ctx.binding = Some(binding);
        next.run(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};

    use crate::controller::{ActionSpec, ActiveController, Controller};
    use crate::pipeline::{ApiRequest, ControllerExecutor, Pipeline};
    use crate::store::InMemoryStore;

    fn run(action: &str, params: &[(&str, &str)]) -> ApiResult<ActionResult> {
        let store = Arc::new(InMemoryStore::new("entries", &["id"], &["id"]));
        let controller: Arc<dyn Controller> = Arc::new(
            ActiveController::new("entry", store).action(
                ActionSpec::new("moveEntry").param("id").param("to").optional_param("note"),
                |ctx| Ok(ActionResult::ok(serde_json::json!(ctx.param("to")))),
            ),
        );
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut ctx = AccessContext::new(
            ApiRequest::new(Method::POST, "/"),
            format!("entry/{}", action),
            controller,
            action,
            params,
        );
        Pipeline::new(ControllerExecutor).with_stage(Dispatch).run(&mut ctx)
    }

    #[test]
    fn test_dispatch_custom_action() {
        let result = run("move-entry", &[("id", "1"), ("to", "archive")]).unwrap();
        assert_eq!(result.body, Some(serde_json::json!("archive")));
    }

    #[test]
    fn test_missing_required_param() {
        let err = run("move-entry", &[("id", "1")]).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing required parameters: to");
    }

    #[test]
    fn test_unknown_action() {
        let err = run("teleport", &[]).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
