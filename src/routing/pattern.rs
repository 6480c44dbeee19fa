//! # Pattern Generator
//!
//! Builds the ordered `pattern -> action` map for a controller from its
//! discovered actions, its verb map and each action's declared parameters.
//!
//! Pattern grammar: `[VERB[,VERB...] ]segment[/<param>...]`

use crate::controller::{action_params, discover_actions, Controller, VerbMap};

/// Dash-case an action name: `createEntry` -> `create-entry`.
///
/// A dash goes before every uppercase letter that does not directly follow
/// another uppercase letter, so acronyms stay in one piece
/// (`exportCSV` -> `export-csv`).
pub fn camel_to_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len() + 4);
    let mut prev_upper = false;
    for ch in name.chars() {
        let upper = ch.is_uppercase();
        if upper && !prev_upper {
            id.push('-');
        }
        id.extend(ch.to_lowercase());
        prev_upper = upper;
    }
    id.trim_matches('-').to_string()
}

/// One `pattern -> action` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern: String,
    pub action: String,
}

/// Insertion-ordered map from pattern to action ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    entries: Vec<PatternEntry>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action for a pattern. An existing pattern keeps its position
    /// and takes the new action.
    pub fn insert(&mut self, pattern: impl Into<String>, action: impl Into<String>) {
        let pattern = pattern.into();
        let action = action.into();
        match self.entries.iter_mut().find(|e| e.pattern == pattern) {
            Some(entry) => entry.action = action,
            None => self.entries.push(PatternEntry { pattern, action }),
        }
    }

    /// Builder form of [`PatternSet::insert`]
    pub fn with(mut self, pattern: &str, action: &str) -> Self {
        self.insert(pattern, action);
        self
    }

    /// Left-biased union: patterns already present keep their action
    pub fn union(mut self, other: &PatternSet) -> Self {
        for entry in &other.entries {
            if self.get(&entry.pattern).is_none() {
                self.entries.push(entry.clone());
            }
        }
        self
    }

    /// Action for a pattern
    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.pattern == pattern)
            .map(|e| e.action.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }

    /// Patterns in insertion order
    pub fn patterns(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.pattern.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generate patterns for `actions`, in order.
///
/// Each action yields `prefix + segment + "/" + <p1>/<p2>...` when it
/// declares parameters, then `prefix + segment` always, where `prefix` is
/// the action's verb restriction followed by a space (empty when
/// unrestricted) and `segment` is the dash-cased action name.
pub fn generate_patterns<F>(actions: &[String], verbs: &VerbMap, params: F) -> PatternSet
where
    F: Fn(&str) -> Vec<String>,
{
    let mut patterns = PatternSet::new();
    for action in actions {
        let prefix = match verbs.get(action) {
            Some(allowed) if !allowed.is_empty() => format!("{} ", allowed.join(",")),
            _ => String::new(),
        };
        let segment = camel_to_id(action);

        let tokens: Vec<String> = params(action)
            .iter()
            .map(|name| format!("<{}>", name))
            .collect();
        if !tokens.is_empty() {
            patterns.insert(format!("{}{}/{}", prefix, segment, tokens.join("/")), segment.clone());
        }
        patterns.insert(format!("{}{}", prefix, segment), segment);
    }
    patterns
}

/// Conventional CRUD patterns every resource gets after its own
pub fn default_patterns() -> PatternSet {
    PatternSet::new()
        .with("PUT,PATCH <id>", "update")
        .with("DELETE <id>", "delete")
        .with("GET,HEAD <id>", "view")
        .with("POST", "create")
        .with("GET,HEAD", "list")
        .with("<id>", "options")
        .with("", "options")
}

/// Full pattern set of a controller: its discovered actions first, then
/// the CRUD defaults for patterns not already taken.
pub fn controller_patterns(controller: &dyn Controller) -> PatternSet {
    let verbs = VerbMap::standard().merge(&controller.verbs());
    let actions = discover_actions(controller);
    generate_patterns(&actions, &verbs, |action| action_params(controller, action))
        .union(&default_patterns())
}
