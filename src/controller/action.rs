//! # Actions
//!
//! Declarations for the operations a controller exposes: the standard CRUD
//! set, custom actions with their positional parameters, and per-action
//! HTTP method restrictions.

use axum::http::Method;

use crate::routing::camel_to_id;

/// A declared action parameter; each one becomes a `<name>` route token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
}

/// A custom action registered on a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    /// Action name in camel case (`createEntry`)
    pub name: String,
    /// Positional parameters in declaration order
    pub params: Vec<ParamSpec>,
    /// Parameter carrying the key of the record this action works on
    pub record_param: Option<String>,
    /// Whether the access check runs before the handler
    pub access_checked: bool,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            record_param: None,
            access_checked: false,
        }
    }

    /// Add a required parameter
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Add an optional parameter
    pub fn optional_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Resolve and access-check a record from parameter `name` before the
    /// handler runs. Declares the parameter if it is not declared yet.
    pub fn with_record_param(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.params.iter().any(|p| p.name == name) {
            self = self.param(name.clone());
        }
        self.record_param = Some(name);
        self.access_checked = true;
        self
    }

    /// Run the access check (without a record) before the handler
    pub fn checked(mut self) -> Self {
        self.access_checked = true;
        self
    }

    /// Dash-cased action ID used in URLs and route targets
    pub fn id(&self) -> String {
        camel_to_id(&self.name)
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// How the pipeline should treat this action
    pub fn binding(&self) -> ActionBinding {
        ActionBinding {
            id: self.id(),
            params: self.params.clone(),
            record_param: self.record_param.clone(),
            access_checked: self.access_checked,
        }
    }
}

/// The standard REST actions every active controller provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardAction {
    List,
    View,
    Create,
    Update,
    Delete,
    Options,
}

impl StandardAction {
    pub const ALL: [StandardAction; 6] = [
        StandardAction::List,
        StandardAction::View,
        StandardAction::Create,
        StandardAction::Update,
        StandardAction::Delete,
        StandardAction::Options,
    ];

    /// Action ID
    pub fn id(&self) -> &'static str {
        match self {
            StandardAction::List => "list",
            StandardAction::View => "view",
            StandardAction::Create => "create",
            StandardAction::Update => "update",
            StandardAction::Delete => "delete",
            StandardAction::Options => "options",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    /// Methods the action accepts by default
    pub fn verbs(&self) -> &'static [&'static str] {
        match self {
            StandardAction::List | StandardAction::View => &["GET", "HEAD"],
            StandardAction::Create => &["POST"],
            StandardAction::Update => &["PUT", "PATCH"],
            StandardAction::Delete => &["DELETE"],
            StandardAction::Options => &["OPTIONS"],
        }
    }

    pub fn binding(&self) -> ActionBinding {
        let record_param = match self {
            StandardAction::View | StandardAction::Update | StandardAction::Delete => {
                Some("id".to_string())
            }
            _ => None,
        };
        ActionBinding {
            id: self.id().to_string(),
            params: record_param
                .iter()
                .map(|name| ParamSpec {
                    name: name.clone(),
                    required: true,
                })
                .collect(),
            record_param,
            access_checked: !matches!(self, StandardAction::List | StandardAction::Options),
        }
    }
}

/// Pipeline-facing description of a resolved action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    pub id: String,
    pub params: Vec<ParamSpec>,
    pub record_param: Option<String>,
    pub access_checked: bool,
}

impl ActionBinding {
    /// Required parameters absent from `present`
    pub fn missing_params<'a>(&'a self, present: impl Fn(&str) -> bool) -> Vec<&'a str> {
        self.params
            .iter()
            .filter(|p| p.required && !present(&p.name))
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Allowed HTTP methods per action.
///
/// Keys are normalized to action IDs, so `createEntry` and `create-entry`
/// name the same entry. Insertion order is kept for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbMap {
    entries: Vec<(String, Vec<String>)>,
}

impl VerbMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for the standard actions
    pub fn standard() -> Self {
        StandardAction::ALL
            .iter()
            .fold(Self::new(), |map, action| map.with(action.id(), action.verbs()))
    }

    /// Builder form of [`VerbMap::insert`]
    pub fn with(mut self, action: &str, verbs: &[&str]) -> Self {
        self.insert(action, verbs);
        self
    }

    /// Set the allowed methods for an action, replacing earlier entries
    pub fn insert(&mut self, action: &str, verbs: &[&str]) {
        let key = camel_to_id(action);
        let verbs: Vec<String> = verbs.iter().map(|v| v.to_ascii_uppercase()).collect();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = verbs,
            None => self.entries.push((key, verbs)),
        }
    }

    /// Allowed methods for an action, if restricted
    pub fn get(&self, action: &str) -> Option<&[String]> {
        let key = camel_to_id(action);
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, verbs)| verbs.as_slice())
    }

    /// Overlay `other` on this map; entries in `other` win
    pub fn merge(mut self, other: &VerbMap) -> Self {
        for (action, verbs) in &other.entries {
            let verbs: Vec<&str> = verbs.iter().map(String::as_str).collect();
            self.insert(action, &verbs);
        }
        self
    }

    /// Parsed methods for an action; unknown method names are skipped
    pub fn methods(&self, action: &str) -> Vec<Method> {
        self.get(action)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| Method::from_bytes(v.as_bytes()).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
