//! # Controller Module
//!
//! Resource controllers: the operations they expose, how those operations
//! are discovered for routing, and access control.

pub mod access;
pub mod action;
pub mod active;
pub mod discovery;

pub use access::{AccessRule, OwnerAccess, RecordAccess};
pub use action::{ActionBinding, ActionSpec, ParamSpec, StandardAction, VerbMap};
pub use active::{ActiveController, ControllerSettings};
pub use discovery::{action_params, discover_actions};

use std::sync::Arc;

use serde_json::Value;

use crate::errors::ApiResult;
use crate::pipeline::{AccessContext, ActionResult, Stage};

/// A resource controller
pub trait Controller: Send + Sync {
    /// Controller ID
    fn id(&self) -> &str;

    /// Custom actions, in declaration order
    fn actions(&self) -> &[ActionSpec];

    /// Allowed HTTP methods per action
    fn verbs(&self) -> VerbMap {
        VerbMap::standard()
    }

    /// Resolve an action ID to its binding, `None` if unknown
    fn binding(&self, action: &str) -> Option<ActionBinding>;

    /// Whether an action fails without an identity
    fn requires_auth(&self, _action: &str) -> bool {
        true
    }

    /// Override of the global OPTIONS authentication exemption
    fn anonymous_options(&self) -> Option<bool> {
        None
    }

    /// Extra stages the resource contributes, run after the standard ones
    fn extra_stages(&self) -> Vec<Arc<dyn Stage>> {
        Vec::new()
    }

    /// Look up the record an action works on
    fn find_record(&self, raw_key: &str, ctx: &AccessContext) -> ApiResult<Value>;

    /// Route-level then record-level access check
    fn check_access(&self, action: &str, record: Option<&Value>, ctx: &AccessContext) -> ApiResult<()>;

    /// Run the action
    fn run_action(&self, ctx: &AccessContext) -> ApiResult<ActionResult>;
}
