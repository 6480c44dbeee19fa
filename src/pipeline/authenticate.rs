//! Authenticate Stage
//!
//! Establishes the identity through the configured auth method. A request
//! without an identity fails only if its action requires one. OPTIONS
//! requests are exempt by default, since some browsers send credentials on
//! CORS preflight and a 401 there breaks the real request.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::AuthMethod;
use crate::controller::StandardAction;
use crate::errors::{ApiError, ApiResult};

use super::context::AccessContext;
use super::response::ActionResult;
use super::stage::{Next, Stage};

/// Authentication stage
pub struct Authenticate {
    method: Arc<dyn AuthMethod>,
    anonymous_options: bool,
}

impl Authenticate {
    pub fn new(method: Arc<dyn AuthMethod>) -> Self {
        Self {
            method,
            anonymous_options: true,
        }
    }

    /// Whether OPTIONS skips the identity requirement (default `true`).
    /// Controllers may override this per resource.
    pub fn with_anonymous_options(mut self, allow: bool) -> Self {
        self.anonymous_options = allow;
        self
    }

    /// Only the options action itself is exempt, never another action
    /// reached with the OPTIONS method.
    fn exempt(&self, ctx: &AccessContext) -> bool {
        ctx.request.is_options()
            && ctx.action == StandardAction::Options.id()
            && ctx
                .controller
                .anonymous_options()
                .unwrap_or(self.anonymous_options)
    }
}

impl Stage for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    fn process(&self, ctx: &mut AccessContext, next: Next<'_>) -> ApiResult<ActionResult> {
        if let Some(identity) = self.method.authenticate(&ctx.request) {
            debug!(request_id = %ctx.request_id, method = self.method.name(), identity = %identity.id, "authenticated");
            ctx.identity = Some(identity);
            return next.run(ctx);
        }

        if self.exempt(ctx) || !ctx.controller.requires_auth(&ctx.action) {
            return next.run(ctx);
        }

        warn!(request_id = %ctx.request_id, route = %ctx.route, "authentication required");
        Err(ApiError::Unauthorized {
            challenge: self.method.challenge(),
        })
    }
}
