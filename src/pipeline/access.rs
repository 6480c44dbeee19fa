//! Access-Check Stage
//!
//! For actions bound to a record, resolves the record first; then, for
//! access-checked actions, runs the controller's route-level and
//! record-level checks.

use tracing::warn;

use crate::errors::{ApiError, ApiResult};

use super::context::AccessContext;
use super::response::ActionResult;
use super::stage::{Next, Stage};

/// Access-check stage
pub struct AccessCheck;

impl Stage for AccessCheck {
    fn name(&self) -> &'static str {
        "access-check"
    }

    fn process(&self, ctx: &mut AccessContext, next: Next<'_>) -> ApiResult<ActionResult> {
        let binding = ctx
            .binding
            .clone()
            .ok_or_else(|| ApiError::Internal(format!("{} reached access check undispatched", ctx.route)))?;

        if let Some(param) = &binding.record_param {
            let record = {
                let raw = ctx
                    .param(param)
                    .ok_or_else(|| ApiError::MissingParam(param.clone()))?;
                ctx.controller.find_record(raw, ctx)?
            };
            ctx.record = Some(record);
        }

        if binding.access_checked {
            if let Err(err) = ctx
                .controller
                .check_access(&ctx.action, ctx.record.as_ref(), ctx)
            {
                warn!(
                    request_id = %ctx.request_id,
                    route = %ctx.route,
                    identity = ctx.identity().map(|i| i.id.as_str()).unwrap_or("-"),
                    error = %err,
                    "access denied"
                );
                return Err(err);
            }
        }

        next.run(ctx)
    }
}
