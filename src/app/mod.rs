//! # Application
//!
//! Controller and module registry, the build-once route table, and request
//! dispatch from a resolved route into the pipeline.
//!
//! The route table is built lazily on first use and never changes after
//! that, so it is read without locking from every request.

pub mod bootstrap;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::auth::{AuthMethod, CompositeAuth};
use crate::controller::Controller;
use crate::errors::ApiError;
use crate::pipeline::{finalize, negotiate, AccessContext, ApiRequest, ApiResponse, Pipeline};
use crate::routing::{
    controller_patterns, decode_params, default_patterns, merge_routes, ModuleRegistry, PatternSet, Resolution,
    RouteRule, RouteTable, UrlRuleConfig,
};

/// A routing container: controllers under one ID, reached through its
/// default route
pub struct Module {
    id: String,
    default_route: String,
    controllers: HashMap<String, Arc<dyn Controller>>,
}

impl Module {
    pub fn new(id: impl Into<String>, default_route: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_route: default_route.into(),
            controllers: HashMap::new(),
        }
    }

    /// Register a controller under its own ID
    pub fn controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.insert(controller.id().to_string(), controller);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(id)
    }
}

/// A REST application
pub struct Application {
    rule: UrlRuleConfig,
    controllers: HashMap<String, Arc<dyn Controller>>,
    modules: HashMap<String, Module>,
    fallback: Vec<RouteRule>,
    pipeline: Pipeline,
    table: OnceLock<RouteTable>,
}

impl Application {
    pub fn builder(rule: UrlRuleConfig) -> ApplicationBuilder {
        ApplicationBuilder::new(rule)
    }

    /// The route table, built on first access
    pub fn route_table(&self) -> &RouteTable {
        self.table.get_or_init(|| {
            merge_routes(&self.rule, |key| self.patterns_for(key), self, &self.fallback)
        })
    }

    /// Pattern set for a resource key. A module uses its default
    /// controller's patterns.
    pub fn patterns_for(&self, key: &str) -> PatternSet {
        let controller = match self.modules.get(key) {
            Some(module) => module.get(&module.default_route),
            None => self.controllers.get(key),
        };
        match controller {
            Some(controller) => controller_patterns(controller.as_ref()),
            None => default_patterns(),
        }
    }

    /// Find the controller and action ID for a route target
    /// (`controller/action` or `module/controller/action`)
    pub fn resolve_controller(&self, route: &str) -> Option<(Arc<dyn Controller>, String)> {
        let parts: Vec<&str> = route.split('/').collect();
        match parts.as_slice() {
            [controller, action] => self
                .controllers
                .get(*controller)
                .map(|c| (Arc::clone(c), action.to_string())),
            [module, controller, action] => self
                .modules
                .get(*module)
                .and_then(|m| m.get(controller))
                .map(|c| (Arc::clone(c), action.to_string())),
            _ => None,
        }
    }

    pub fn controller(&self, id: &str) -> Option<&Arc<dyn Controller>> {
        self.controllers.get(id)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Route a request and run it through the pipeline.
    ///
    /// Routing failures still go through post-processing, so they carry the
    /// same CORS headers as any other response.
    pub fn handle(&self, request: ApiRequest) -> ApiResponse {
        let route_match = match self.route_table().resolve(&request.method, &request.path) {
            Resolution::Matched(route_match) => route_match,
            Resolution::MethodNotAllowed(allowed) => {
                let format = negotiate(&request);
                return finalize(Err(ApiError::MethodNotAllowed(allowed)), &request, format);
            }
            Resolution::NotFound => {
                let format = negotiate(&request);
                return finalize(Err(ApiError::not_found("Page not found.")), &request, format);
            }
        };

        let Some((controller, action)) = self.resolve_controller(&route_match.route) else {
            let format = negotiate(&request);
            let err = ApiError::not_found(format!(
                "Unable to resolve the request \"{}\".",
                route_match.route
            ));
            return finalize(Err(err), &request, format);
        };

        debug!(
            method = %request.method,
            path = %request.path,
            route = %route_match.route,
            preflight = route_match.preflight,
            "route matched"
        );

        let route_params = match decode_params(route_match.params) {
            Ok(params) => params,
            Err(e) => {
                let format = negotiate(&request);
                let err = ApiError::bad_request(format!("Invalid path parameter: {}", e));
                return finalize(Err(err), &request, format);
            }
        };

        // Route parameters win over query parameters of the same name.
        let mut params = request.query.clone();
        params.extend(route_params);

        let ctx = AccessContext::new(request, route_match.route, controller, action, params);
        self.pipeline.handle(ctx)
    }
}

impl ModuleRegistry for Application {
    fn default_route(&self, id: &str) -> Option<String> {
        self.modules.get(id).map(|m| m.default_route.clone())
    }
}

/// Builder for [`Application`]
pub struct ApplicationBuilder {
    rule: UrlRuleConfig,
    controllers: HashMap<String, Arc<dyn Controller>>,
    modules: HashMap<String, Module>,
    fallback: Vec<RouteRule>,
    auth: Option<Arc<dyn AuthMethod>>,
    anonymous_options: bool,
    pipeline: Option<Pipeline>,
}

impl ApplicationBuilder {
    pub fn new(rule: UrlRuleConfig) -> Self {
        Self {
            rule,
            controllers: HashMap::new(),
            modules: HashMap::new(),
            fallback: Vec::new(),
            auth: None,
            anonymous_options: true,
            pipeline: None,
        }
    }

    /// Register a controller under its ID
    pub fn controller(mut self, controller: Arc<dyn Controller>) -> Self {
        self.controllers.insert(controller.id().to_string(), controller);
        self
    }

    /// Register a module
    pub fn module(mut self, module: Module) -> Self {
        self.modules.insert(module.id.clone(), module);
        self
    }

    /// Rule appended after all synthesized rules
    pub fn fallback(mut self, rule: RouteRule) -> Self {
        self.fallback.push(rule);
        self
    }

    /// Authentication method for the standard pipeline
    pub fn auth(mut self, auth: Arc<dyn AuthMethod>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Global OPTIONS authentication exemption (default `true`)
    pub fn anonymous_options(mut self, allow: bool) -> Self {
        self.anonymous_options = allow;
        self
    }

    /// Use a custom pipeline instead of the standard one
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn build(self) -> Application {
        let pipeline = match self.pipeline {
            Some(pipeline) => pipeline,
            None => {
                let auth = self
                    .auth
                    .unwrap_or_else(|| Arc::new(CompositeAuth::new()));
                Pipeline::standard(auth, self.anonymous_options)
            }
        };

        Application {
            rule: self.rule,
            controllers: self.controllers,
            modules: self.modules,
            fallback: self.fallback,
            pipeline,
            table: OnceLock::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::auth::{Identity, StaticTokenValidator};
    use crate::controller::{ActionSpec, ActiveController};
    use crate::pipeline::ActionResult;
    use crate::store::InMemoryStore;

    fn app() -> Application {
        let entries = Arc::new(
            InMemoryStore::new("entries", &["id", "title"], &["id"])
                .with_records(vec![json!({"id": 1, "title": "first"})])
                .unwrap(),
        );
        let entry = ActiveController::new("entry", entries.clone())
            .action(ActionSpec::new("createEntry").param("id"), |ctx| {
                Ok(ActionResult::ok(json!({"created": ctx.param("id")})))
            })
            .verbs_for("createEntry", &["POST"]);
        let reports = ActiveController::new("default", entries)
            .action(ActionSpec::new("summary"), |_| Ok(ActionResult::ok(json!("summary"))));

        let tokens = StaticTokenValidator::new().with_token("t", Identity::new("alice"));
        Application::builder(
            UrlRuleConfig::new("api")
                .resource("entries", "entry")
                .resource("reports", "reports"),
        )
        .controller(Arc::new(entry))
        .module(Module::new("reports", "default").controller(Arc::new(reports)))
        .auth(Arc::new(CompositeAuth::token(Arc::new(tokens), "access-token")))
        .build()
    }

    fn get(path: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, path).with_query("access-token", "t")
    }

    #[test]
    fn test_route_table_built_once() {
        let app = app();
        let first = app.route_table() as *const RouteTable;
        let second = app.route_table() as *const RouteTable;
        assert_eq!(first, second);
        assert_eq!(app.route_table().patterns()[0], "POST api/entries/create-entry/<id>");
    }

    #[test]
    fn test_module_patterns_from_default_controller() {
        let app = app();
        let routes: Vec<&str> = app.route_table().rules().iter().map(|r| r.route()).collect();
        assert!(routes.contains(&"reports/default/summary"));
        assert!(routes.contains(&"reports/default/list"));
    }

    #[test]
    fn test_handle_custom_action() {
        let app = app();
        let request = ApiRequest::new(Method::POST, "/api/entries/create-entry/9").with_query("access-token", "t");
        let response = app.handle(request);
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Some(json!({"created": "9"})));
    }

    #[test]
    fn test_handle_module_action() {
        let response = app().handle(get("/api/reports/summary"));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Some(json!("summary")));
    }

    #[test]
    fn test_route_params_override_query() {
        let app = app();
        let request = ApiRequest::new(Method::POST, "/api/entries/create-entry/9")
            .with_query("access-token", "t")
            .with_query("id", "1");
        assert_eq!(app.handle(request).body, Some(json!({"created": "9"})));
    }

    #[test]
    fn test_unknown_path_has_cors() {
        let response = app().handle(get("/nowhere").with_header("Origin", "https://x.example"));
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.headers.get("Access-Control-Allow-Origin"), Some("https://x.example"));
    }

    #[test]
    fn test_route_params_are_percent_decoded() {
        let app = app();
        let request = ApiRequest::new(Method::POST, "/api/entries/create-entry/a%20b").with_query("access-token", "t");
        assert_eq!(app.handle(request).body, Some(json!({"created": "a b"})));

        let request = ApiRequest::new(Method::POST, "/api/entries/create-entry/%FF").with_query("access-token", "t");
        assert_eq!(app.handle(request).status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_resolve_controller() {
        let app = app();
        assert!(app.resolve_controller("entry/view").is_some());
        assert!(app.resolve_controller("reports/default/list").is_some());
        assert!(app.resolve_controller("reports/other/list").is_none());
        assert!(app.resolve_controller("view").is_none());
    }
}
