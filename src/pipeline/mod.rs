//! # Pipeline Module
//!
//! Request model, per-request access context, and the stage chain that
//! wraps every action: authentication, format negotiation, dispatch,
//! access checks, execution and post-processing.

pub mod access;
pub mod authenticate;
pub mod context;
pub mod dispatch;
pub mod negotiate;
pub mod post;
pub mod request;
pub mod response;
pub mod stage;

pub use access::AccessCheck;
pub use authenticate::Authenticate;
pub use context::AccessContext;
pub use dispatch::Dispatch;
pub use negotiate::{negotiate, NegotiateFormat, ResponseFormat, CALLBACK_PARAM};
pub use post::{apply_cors, error_response, finalize, wrap_callback, JSON_CONTENT_TYPE};
pub use request::ApiRequest;
pub use response::{ActionResult, ApiResponse, ResponseHeaders};
pub use stage::{ControllerExecutor, Executor, Next, Pipeline, PipelineBuilder, Stage};
