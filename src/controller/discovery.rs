//! # Action Discovery
//!
//! Enumerates the custom actions a controller implements. Controllers
//! register actions explicitly, so discovery is a pure read of that
//! registration: declaration order, duplicates dropped.

use super::Controller;

/// Names of the custom actions a controller exposes
pub fn discover_actions(controller: &dyn Controller) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for spec in controller.actions() {
        if !names.contains(&spec.name) {
            names.push(spec.name.clone());
        }
    }
    names
}

/// Declared parameter names of an action, in declaration order
pub fn action_params(controller: &dyn Controller, action: &str) -> Vec<String> {
    controller
        .actions()
        .iter()
        .find(|spec| spec.name == action)
        .map(|spec| spec.param_names())
        .unwrap_or_default()
}
