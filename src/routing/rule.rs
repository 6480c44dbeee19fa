//! # Route Rules
//!
//! A rule is a compiled pattern: optional verb filter, a `/`-separated
//! template of literals and `<param>` placeholders, and a fully qualified
//! route target. The route table matches rules in order; first match wins.

use std::collections::HashMap;
use std::fmt;
use std::string::FromUtf8Error;

use axum::http::Method;

/// Verbs recognized in a pattern's verb prefix
const PATTERN_VERBS: [&str; 7] = ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// One template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Matches exactly one non-empty path segment
    Param(String),
}

/// A compiled route rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    verbs: Vec<Method>,
    template: String,
    segments: Vec<Segment>,
    route: String,
}

impl RouteRule {
    /// Compile `pattern` under `prefix`, targeting `route`.
    ///
    /// A leading comma-separated list of known verbs, alone or followed by
    /// whitespace, becomes the verb filter. Anything else is path.
    pub fn new(pattern: &str, prefix: &str, route: impl Into<String>) -> Self {
        let (verbs, path) = split_verbs(pattern);
        let template = format!("{}/{}", prefix, path).trim_matches('/').to_string();
        let segments = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();

        Self {
            verbs,
            template,
            segments,
            route: route.into(),
        }
    }

    /// Canonical pattern string (`GET,HEAD api/users/<id>`)
    pub fn pattern(&self) -> String {
        if self.verbs.is_empty() {
            self.template.clone()
        } else {
            let verbs: Vec<&str> = self.verbs.iter().map(Method::as_str).collect();
            format!("{} {}", verbs.join(","), self.template)
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Verb filter; empty means any method
    pub fn verbs(&self) -> &[Method] {
        &self.verbs
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.verbs.is_empty() || self.verbs.contains(method)
    }

    /// Whether the rule targets a controller's options action
    pub fn targets_options(&self) -> bool {
        self.route.rsplit('/').next() == Some("options")
    }

    /// Match a request path, capturing placeholder values
    pub fn matches_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.pattern(), self.route)
    }
}

fn split_verbs(pattern: &str) -> (Vec<Method>, &str) {
    let pattern = pattern.trim();
    let (head, rest) = match pattern.find(char::is_whitespace) {
        Some(at) => (&pattern[..at], pattern[at..].trim_start()),
        None => (pattern, ""),
    };

    let is_verb_list = !head.is_empty() && head.split(',').all(|v| PATTERN_VERBS.contains(&v));
    if !is_verb_list {
        return (Vec::new(), pattern);
    }

    let verbs = head
        .split(',')
        .filter_map(|v| Method::from_bytes(v.as_bytes()).ok())
        .collect();
    (verbs, rest)
}

/// Percent-decode captured parameter values. Paths are matched on their
/// raw segments, so an encoded `/` (`%2F`) never splits a segment.
pub fn decode_params(params: HashMap<String, String>) -> Result<HashMap<String, String>, FromUtf8Error> {
    params
        .into_iter()
        .map(|(name, raw)| Ok((name, urlencoding::decode(&raw)?.into_owned())))
        .collect()
}

/// The options action of the controller owning `route`
fn options_route(route: &str) -> String {
    match route.rsplit_once('/') {
        Some((controller, _)) => format!("{}/options", controller),
        None => "options".to_string(),
    }
}

/// A successful route match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Fully qualified route target
    pub route: String,
    /// Captured placeholder values
    pub params: HashMap<String, String>,
    /// Set when an OPTIONS request was redirected to the options action
    pub preflight: bool,
}

/// Outcome of resolving a request against the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(RouteMatch),
    /// The path matched, but only under other methods
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Ordered, immutable rule list
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Canonical patterns in table order
    pub fn patterns(&self) -> Vec<String> {
        self.rules.iter().map(RouteRule::pattern).collect()
    }

    /// Resolve a request. The first rule matching both path and method wins.
    ///
    /// An OPTIONS request whose path is only matched by verb-restricted rules
    /// goes to the options action of the first such rule's controller.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let mut first_path_match: Option<(&RouteRule, HashMap<String, String>)> = None;
        let mut allowed: Vec<Method> = Vec::new();

        for rule in &self.rules {
            let Some(params) = rule.matches_path(path) else {
                continue;
            };
            if rule.allows(method) {
                // Rules without a verb filter also match OPTIONS; only the
                // options action may answer it.
                let preflight = *method == Method::OPTIONS
                    && rule.verbs.is_empty()
                    && !rule.targets_options();
                let route = if preflight {
                    options_route(&rule.route)
                } else {
                    rule.route.clone()
                };
                return Resolution::Matched(RouteMatch {
                    route,
                    params,
                    preflight,
                });
            }
            for verb in &rule.verbs {
                if !allowed.contains(verb) {
                    allowed.push(verb.clone());
                }
            }
            if first_path_match.is_none() {
                first_path_match = Some((rule, params));
            }
        }

        match first_path_match {
            Some((rule, params)) if *method == Method::OPTIONS => Resolution::Matched(RouteMatch {
                route: options_route(&rule.route),
                params,
                preflight: true,
            }),
            Some(_) => {
                if !allowed.contains(&Method::OPTIONS) {
                    allowed.push(Method::OPTIONS);
                }
                Resolution::MethodNotAllowed(allowed)
            }
            None => Resolution::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_prefix_parsing() {
        let rule = RouteRule::new("PUT,PATCH <id>", "api/users", "user/update");
        assert_eq!(rule.verbs(), &[Method::PUT, Method::PATCH]);
        assert_eq!(rule.template(), "api/users/<id>");
        assert_eq!(rule.pattern(), "PUT,PATCH api/users/<id>");

        let rule = RouteRule::new("GET,HEAD", "api/users", "user/list");
        assert_eq!(rule.verbs(), &[Method::GET, Method::HEAD]);
        assert_eq!(rule.template(), "api/users");

        let rule = RouteRule::new("", "api/users", "user/options");
        assert!(rule.verbs().is_empty());
        assert_eq!(rule.pattern(), "api/users");
    }

    #[test]
    fn test_non_verb_head_is_path() {
        let rule = RouteRule::new("search/<term>", "api/users", "user/search");
        assert!(rule.verbs().is_empty());
        assert_eq!(rule.template(), "api/users/search/<term>");
    }

    #[test]
    fn test_matches_path() {
        let rule = RouteRule::new("create-entry/<id>/<slot>", "api/entries", "entry/create-entry");
        let params = rule.matches_path("/api/entries/create-entry/5/a").unwrap();
        assert_eq!(params["id"], "5");
        assert_eq!(params["slot"], "a");

        assert!(rule.matches_path("/api/entries/create-entry/5").is_none());
        assert!(rule.matches_path("/api/entries/other/5/a").is_none());
    }

    #[test]
    fn test_decode_params() {
        let rule = RouteRule::new("GET,HEAD <id>", "api/memberships", "membership/view");
        let raw = rule.matches_path("/api/memberships/42%2C7").unwrap();
        assert_eq!(raw["id"], "42%2C7");

        let decoded = decode_params(raw).unwrap();
        assert_eq!(decoded["id"], "42,7");

        let params = HashMap::from([("q".to_string(), "caf%C3%A9%20au%20lait".to_string())]);
        assert_eq!(decode_params(params).unwrap()["q"], "café au lait");

        let params = HashMap::from([("q".to_string(), "%FF%FE".to_string())]);
        assert!(decode_params(params).is_err());
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let table = RouteTable::new(vec![
            RouteRule::new("archive", "api/users", "user/archive"),
            RouteRule::new("GET,HEAD <id>", "api/users", "user/view"),
        ]);

        match table.resolve(&Method::GET, "/api/users/archive") {
            Resolution::Matched(m) => assert_eq!(m.route, "user/archive"),
            other => panic!("unexpected {:?}", other),
        }
        match table.resolve(&Method::GET, "/api/users/7") {
            Resolution::Matched(m) => {
                assert_eq!(m.route, "user/view");
                assert_eq!(m.params["id"], "7");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resolve_method_not_allowed() {
        let table = RouteTable::new(vec![RouteRule::new("POST move/<id>", "api/users", "user/move")]);

        assert_eq!(
            table.resolve(&Method::GET, "/api/users/move/1"),
            Resolution::MethodNotAllowed(vec![Method::POST, Method::OPTIONS])
        );
        assert_eq!(table.resolve(&Method::GET, "/api/nothing"), Resolution::NotFound);
    }

    #[test]
    fn test_options_on_unrestricted_action_goes_to_options() {
        let table = RouteTable::new(vec![
            RouteRule::new("purge", "api/entries", "entry/purge"),
            RouteRule::new("", "api/entries", "entry/options"),
        ]);

        match table.resolve(&Method::OPTIONS, "/api/entries/purge") {
            Resolution::Matched(m) => {
                assert_eq!(m.route, "entry/options");
                assert!(m.preflight);
            }
            other => panic!("unexpected {:?}", other),
        }
        match table.resolve(&Method::OPTIONS, "/api/entries") {
            Resolution::Matched(m) => {
                assert_eq!(m.route, "entry/options");
                assert!(!m.preflight);
            }
            other => panic!("unexpected {:?}", other),
        }
        match table.resolve(&Method::GET, "/api/entries/purge") {
            Resolution::Matched(m) => assert_eq!(m.route, "entry/purge"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resolve_preflight_rewrite() {
        let table = RouteTable::new(vec![RouteRule::new(
            "POST move/<id>",
            "api/admin",
            "admin/default/move",
        )]);

        match table.resolve(&Method::OPTIONS, "/api/admin/move/1") {
            Resolution::Matched(m) => {
                assert_eq!(m.route, "admin/default/options");
                assert_eq!(m.params["id"], "1");
                assert!(m.preflight);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
