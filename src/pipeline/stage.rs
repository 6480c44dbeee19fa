//! Access & Behavior Pipeline
//!
//! Fixed, linear stage chain run around every action:
//! Authenticate → Negotiate-Format → Dispatch → Access-Check → Execute,
//! followed by post-processing (callback wrap + CORS) in [`Pipeline::handle`].
//!
//! The chain is built once at startup and shared by all requests. A
//! controller can contribute extra stages, which run after the standard
//! ones and before the action.

use std::sync::Arc;

use tracing::debug;

use crate::auth::AuthMethod;
use crate::errors::ApiResult;

use super::access::AccessCheck;
use super::authenticate::Authenticate;
use super::context::AccessContext;
use super::dispatch::Dispatch;
use super::negotiate::NegotiateFormat;
use super::post::finalize;
use super::response::{ActionResult, ApiResponse};

/// One pipeline stage
pub trait Stage: Send + Sync {
    /// Stage name for logs
    fn name(&self) -> &'static str;

    /// Process the request, usually by calling `next.run(ctx)`
    fn process(&self, ctx: &mut AccessContext, next: Next<'_>) -> ApiResult<ActionResult>;
}

/// Remainder of the chain
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    executor: &'a dyn Executor,
}

impl<'a> Next<'a> {
    /// Run the next stage, or the executor at the end of the chain
    pub fn run(self, ctx: &mut AccessContext) -> ApiResult<ActionResult> {
        match self.stages.split_first() {
            Some((first, rest)) => {
                let next = Next {
                    stages: rest,
                    executor: self.executor,
                };
                first.process(ctx, next)
            }
            None => self.executor.execute(ctx),
        }
    }
}

/// Final stage: runs the action
pub trait Executor: Send + Sync {
    fn execute(&self, ctx: &AccessContext) -> ApiResult<ActionResult>;
}

/// Runs the action on the context's controller
pub struct ControllerExecutor;

impl Executor for ControllerExecutor {
    fn execute(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        ctx.controller.run_action(ctx)
    }
}

/// The request pipeline
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    executor: Arc<dyn Executor>,
}

impl Pipeline {
    /// Create a pipeline with no stages
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self {
            stages: Vec::new(),
            executor: Arc::new(executor),
        }
    }

    /// The standard stage chain
    pub fn standard(auth: Arc<dyn AuthMethod>, anonymous_options: bool) -> Self {
        PipelineBuilder::new()
            .with(Authenticate::new(auth).with_anonymous_options(anonymous_options))
            .with(NegotiateFormat)
            .with(Dispatch)
            .with(AccessCheck)
            .build(ControllerExecutor)
    }

    /// Add a stage to the end of the chain
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Run the chain, including the controller's extra stages
    pub fn run(&self, ctx: &mut AccessContext) -> ApiResult<ActionResult> {
        let extra = ctx.controller.extra_stages();
        if extra.is_empty() {
            return Next {
                stages: &self.stages,
                executor: self.executor.as_ref(),
            }
            .run(ctx);
        }

        let stages: Vec<Arc<dyn Stage>> = self.stages.iter().cloned().chain(extra).collect();
        Next {
            stages: &stages,
            executor: self.executor.as_ref(),
        }
        .run(ctx)
    }

    /// Run the chain and post-process the outcome. Errors become error
    /// responses; every response gets CORS headers.
    pub fn handle(&self, mut ctx: AccessContext) -> ApiResponse {
        let result = self.run(&mut ctx);
        let response = finalize(result, &ctx.request, ctx.format);
        debug!(
            request_id = %ctx.request_id,
            route = %ctx.route,
            status = response.status.as_u16(),
            elapsed_ms = ctx.elapsed_ms() as u64,
            "request completed"
        );
        response
    }

    /// Stage names in order, excluding controller stages
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for pipeline construction
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Stage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Add a stage
    pub fn with(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Build the pipeline with the given executor
    pub fn build(self, executor: impl Executor + 'static) -> Pipeline {
        Pipeline {
            stages: self.stages,
            executor: Arc::new(executor),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
