//! # Active Controller
//!
//! Generic controller over a `RecordStore`: the standard list / view /
//! create / update / delete / options actions plus any number of custom
//! actions registered with their parameter declarations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::http::Method;
use serde_json::Value;
use tracing::debug;

use crate::errors::{ApiError, ApiResult};
use crate::pipeline::{AccessContext, ActionResult, Stage};
use crate::search::{build_search_filter, FilterExpr, Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::store::{RecordKey, RecordQuery, RecordStore, DEFAULT_KEY_DELIMITER};

use super::access::{AccessRule, RecordAccess};
use super::action::{ActionBinding, ActionSpec, StandardAction, VerbMap};
use super::Controller;

/// Query parameter carrying the free-text search
pub const SEARCH_PARAM: &str = "search";

/// Methods answered for collection URLs
pub const COLLECTION_OPTIONS: [Method; 4] = [Method::GET, Method::POST, Method::HEAD, Method::OPTIONS];

/// Methods answered for single-record URLs
pub const RESOURCE_OPTIONS: [Method; 6] = [
    Method::GET,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// Handler for a custom action
pub type ActionHandler = Arc<dyn Fn(&AccessContext) -> ApiResult<ActionResult> + Send + Sync>;

/// Replacement for the default record lookup
pub type Finder<S> = Arc<dyn Fn(&str, &S) -> ApiResult<Value> + Send + Sync>;

/// Replacement for the default list filter (scope + search)
pub type DataProvider = Arc<dyn Fn(&AccessContext) -> ApiResult<FilterExpr> + Send + Sync>;

/// Base scope AND-ed with every list query
pub type Scope = Arc<dyn Fn(&AccessContext) -> FilterExpr + Send + Sync>;

/// Tunables shared by all controllers of an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub key_delimiter: String,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            key_delimiter: DEFAULT_KEY_DELIMITER.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Generic REST controller over one record store
pub struct ActiveController<S: RecordStore> {
    id: String,
    store: Arc<S>,
    settings: ControllerSettings,
    actions: Vec<ActionSpec>,
    handlers: HashMap<String, ActionHandler>,
    verbs: VerbMap,
    rules: Vec<AccessRule>,
    record_access: Option<Arc<dyn RecordAccess>>,
    finder: Option<Finder<S>>,
    data_provider: Option<DataProvider>,
    scope: Option<Scope>,
    public_actions: HashSet<String>,
    anonymous_options: Option<bool>,
    stages: Vec<Arc<dyn Stage>>,
}

impl<S: RecordStore> ActiveController<S> {
    pub fn new(id: impl Into<String>, store: Arc<S>) -> Self {
        Self {
            id: id.into(),
            store,
            settings: ControllerSettings::default(),
            actions: Vec::new(),
            handlers: HashMap::new(),
            verbs: VerbMap::standard(),
            rules: Vec::new(),
            record_access: None,
            finder: None,
            data_provider: None,
            scope: None,
            public_actions: HashSet::new(),
            anonymous_options: None,
            stages: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Register a custom action
    pub fn action<F>(mut self, spec: ActionSpec, handler: F) -> Self
    where
        F: Fn(&AccessContext) -> ApiResult<ActionResult> + Send + Sync + 'static,
    {
        self.handlers.insert(spec.id(), Arc::new(handler));
        self.actions.retain(|existing| existing.name != spec.name);
        self.actions.push(spec);
        self
    }

    /// Restrict an action to some HTTP methods
    pub fn verbs_for(mut self, action: &str, verbs: &[&str]) -> Self {
        self.verbs.insert(action, verbs);
        self
    }

    /// Add a route-level access rule
    pub fn with_rule(mut self, rule: AccessRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Install the record-level access capability
    pub fn with_record_access(mut self, access: impl RecordAccess + 'static) -> Self {
        self.record_access = Some(Arc::new(access));
        self
    }

    /// Replace the primary-key lookup
    pub fn with_finder<F>(mut self, finder: F) -> Self
    where
        F: Fn(&str, &S) -> ApiResult<Value> + Send + Sync + 'static,
    {
        self.finder = Some(Arc::new(finder));
        self
    }

    /// Replace the list filter entirely
    pub fn with_data_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&AccessContext) -> ApiResult<FilterExpr> + Send + Sync + 'static,
    {
        self.data_provider = Some(Arc::new(provider));
        self
    }

    /// Scope every list query (ownership, tenant)
    pub fn with_scope<F>(mut self, scope: F) -> Self
    where
        F: Fn(&AccessContext) -> FilterExpr + Send + Sync + 'static,
    {
        self.scope = Some(Arc::new(scope));
        self
    }

    /// Let an action run without an identity
    pub fn public(mut self, action: &str) -> Self {
        self.public_actions.insert(crate::routing::camel_to_id(action));
        self
    }

    /// Override the OPTIONS authentication exemption for this controller
    pub fn with_anonymous_options(mut self, allow: bool) -> Self {
        self.anonymous_options = Some(allow);
        self
    }

    /// Contribute an extra pipeline stage
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn record_key(&self, record: &Value) -> ApiResult<RecordKey> {
        RecordKey::from_record(record, &self.store.primary_key())
            .ok_or_else(|| ApiError::Internal(format!("{} record without primary key", self.store.name())))
    }

    fn resolved_record<'a>(&self, ctx: &'a AccessContext) -> ApiResult<&'a Value> {
        ctx.record
            .as_ref()
            .ok_or_else(|| ApiError::Internal(format!("{} not resolved before execution", ctx.route)))
    }

    fn list_filter(&self, ctx: &AccessContext) -> ApiResult<FilterExpr> {
        if let Some(provider) = &self.data_provider {
            return provider(ctx);
        }
        let scope = self
            .scope
            .as_ref()
            .map(|scope| scope(ctx))
            .unwrap_or(FilterExpr::All);
        let search = build_search_filter(ctx.request.query_param(SEARCH_PARAM), &self.store.attributes());
        Ok(scope.and(search))
    }

    fn list(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        let filter = self.list_filter(ctx)?;
        let pagination = Pagination::from_query(
            &ctx.request.query,
            self.settings.default_page_size,
            self.settings.max_page_size,
        );

        let query = RecordQuery::all().and_where(filter);
        let mut page = self.store.find(
            &query
                .clone()
                .offset(pagination.requested_offset())
                .limit(pagination.per_page),
        )?;
        // Past the last page: serve the last page instead.
        if pagination.offset(page.total) != pagination.requested_offset() {
            page = self.store.find(
                &query
                    .offset(pagination.offset(page.total))
                    .limit(pagination.per_page),
            )?;
        }

        debug!(route = %ctx.route, total = page.total, returned = page.records.len(), "list served");

        let mut result = ActionResult::ok(Value::Array(page.records));
        for (name, value) in pagination.headers(page.total) {
            result.headers.set(name, value);
        }
        Ok(result)
    }

    fn create(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        let body = ctx.body_object()?;
        let created = self.store.insert(Value::Object(body.clone()))?;
        Ok(ActionResult::created(created))
    }

    fn update(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        let key = self.record_key(self.resolved_record(ctx)?)?;
        let changes = ctx.body_object()?;
        match self.store.update(&key, changes)? {
            Some(updated) => Ok(ActionResult::ok(updated)),
            None => Err(ApiError::not_found(format!(
                "Object not found: {}",
                key.encode(&self.settings.key_delimiter)
            ))),
        }
    }

    fn delete(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        let key = self.record_key(self.resolved_record(ctx)?)?;
        if self.store.delete(&key)? {
            Ok(ActionResult::no_content())
        } else {
            Err(ApiError::not_found(format!(
                "Object not found: {}",
                key.encode(&self.settings.key_delimiter)
            )))
        }
    }

    fn options(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        let allowed: &[Method] = if ctx.param("id").is_some() {
            &RESOURCE_OPTIONS
        } else {
            &COLLECTION_OPTIONS
        };
        if ctx.request.method != Method::OPTIONS {
            return Err(ApiError::MethodNotAllowed(allowed.to_vec()));
        }
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(ActionResult::empty().with_header("Allow", allow))
    }
}

impl<S: RecordStore + 'static> Controller for ActiveController<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn actions(&self) -> &[ActionSpec] {
        &self.actions
    }

    fn verbs(&self) -> VerbMap {
        self.verbs.clone()
    }

    fn binding(&self, action: &str) -> Option<ActionBinding> {
        // Custom actions shadow standard ones of the same ID.
        self.actions
            .iter()
            .find(|spec| spec.id() == action)
            .map(ActionSpec::binding)
            .or_else(|| StandardAction::from_id(action).map(|a| a.binding()))
    }

    fn requires_auth(&self, action: &str) -> bool {
        !self.public_actions.contains(action)
    }

    fn anonymous_options(&self) -> Option<bool> {
        self.anonymous_options
    }

    fn extra_stages(&self) -> Vec<Arc<dyn Stage>> {
        self.stages.clone()
    }

    fn find_record(&self, raw_key: &str, _ctx: &AccessContext) -> ApiResult<Value> {
        if let Some(finder) = &self.finder {
            return finder(raw_key, self.store.as_ref());
        }
        let key = RecordKey::parse(raw_key, &self.store.primary_key(), &self.settings.key_delimiter)?;
        self.store
            .find_one(&key)?
            .ok_or_else(|| ApiError::not_found(format!("Object not found: {}", raw_key)))
    }

    fn check_access(&self, action: &str, record: Option<&Value>, ctx: &AccessContext) -> ApiResult<()> {
        for rule in &self.rules {
            rule.check(action, ctx.identity())?;
        }
        if let (Some(record), Some(access)) = (record, &self.record_access) {
            if !access.check_access(record, ctx.identity()) {
                return Err(ApiError::forbidden("You do not have access"));
            }
        }
        Ok(())
    }

    fn run_action(&self, ctx: &AccessContext) -> ApiResult<ActionResult> {
        if let Some(handler) = self.handlers.get(&ctx.action) {
            return handler(ctx);
        }
        match StandardAction::from_id(&ctx.action) {
            Some(StandardAction::List) => self.list(ctx),
            Some(StandardAction::View) => Ok(ActionResult::ok(self.resolved_record(ctx)?.clone())),
            Some(StandardAction::Create) => self.create(ctx),
            Some(StandardAction::Update) => self.update(ctx),
            Some(StandardAction::Delete) => self.delete(ctx),
            Some(StandardAction::Options) => self.options(ctx),
            None => Err(ApiError::not_found(format!(
                "Unable to resolve the request \"{}\".",
                ctx.route
            ))),
        }
    }
}
