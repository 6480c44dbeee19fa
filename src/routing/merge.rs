//! # Route Table Merger
//!
//! Expands each `url -> resource` mapping of a URL rule into concrete rules
//! under the rule's prefix, delegating resources that are modules to the
//! module's default route, then appends the fallback rules.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::pattern::PatternSet;
use super::rule::{RouteRule, RouteTable};

/// Routing containers known to the application
pub trait ModuleRegistry {
    /// Default route of a module, `None` if no such module
    fn default_route(&self, id: &str) -> Option<String>;

    fn has_module(&self, id: &str) -> bool {
        self.default_route(id).is_some()
    }
}

/// Registry with no modules
pub struct NoModules;

impl ModuleRegistry for NoModules {
    fn default_route(&self, _id: &str) -> Option<String> {
        None
    }
}

/// One URL segment mapped to a controller or module ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMapping {
    pub url: String,
    pub resource: String,
}

/// A REST URL rule: prefix, resources and action filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRuleConfig {
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub resources: Vec<ResourceMapping>,

    /// If non-empty, only these actions get rules
    #[serde(default)]
    pub only: Vec<String>,

    /// Actions that never get rules
    #[serde(default)]
    pub except: Vec<String>,
}

impl UrlRuleConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Map `url` to `resource`
    pub fn resource(mut self, url: impl Into<String>, resource: impl Into<String>) -> Self {
        self.resources.push(ResourceMapping {
            url: url.into(),
            resource: resource.into(),
        });
        self
    }

    pub fn only(mut self, actions: &[&str]) -> Self {
        self.only = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn except(mut self, actions: &[&str]) -> Self {
        self.except = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Whether rules for `action` survive the only/except filters
    pub fn includes(&self, action: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|a| a == action))
            && !self.except.iter().any(|a| a == action)
    }
}

/// Build the route table.
///
/// Resources are expanded in declared order; a URL segment declared twice
/// is expanded once. A resource naming a registered module targets
/// `module/default-route/action` for every pattern instead of being
/// treated as a controller. Fallback rules come last. A rule whose
/// canonical pattern is already taken is dropped.
pub fn merge_routes<F>(
    config: &UrlRuleConfig,
    patterns_for: F,
    modules: &dyn ModuleRegistry,
    fallback: &[RouteRule],
) -> RouteTable
where
    F: Fn(&str) -> PatternSet,
{
    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut seen_patterns: HashSet<String> = HashSet::new();
    let mut rules: Vec<RouteRule> = Vec::new();

    let mut push = |rule: RouteRule, rules: &mut Vec<RouteRule>| {
        if seen_patterns.insert(rule.pattern()) {
            rules.push(rule);
        } else {
            debug!(pattern = %rule.pattern(), route = rule.route(), "duplicate pattern skipped");
        }
    };

    for mapping in &config.resources {
        if !seen_urls.insert(mapping.url.as_str()) {
            debug!(url = %mapping.url, "resource URL declared twice, keeping the first");
            continue;
        }

        let prefix = format!("{}/{}", config.prefix, mapping.url)
            .trim_matches('/')
            .to_string();
        let target = match modules.default_route(&mapping.resource) {
            Some(default_route) => {
                debug!(module = %mapping.resource, default_route = %default_route, "delegating to module");
                format!("{}/{}", mapping.resource, default_route)
            }
            None => mapping.resource.clone(),
        };

        for entry in patterns_for(&mapping.resource).iter() {
            if !config.includes(&entry.action) {
                continue;
            }
            let route = format!("{}/{}", target, entry.action);
            push(RouteRule::new(&entry.pattern, &prefix, route), &mut rules);
        }
    }

    for rule in fallback {
        push(rule.clone(), &mut rules);
    }

    info!(rules = rules.len(), resources = config.resources.len(), "route table built");
    RouteTable::new(rules)
}
