//! # Access Control
//!
//! Route-level role rules, checked first, and the record-level capability
//! a resource can implement to decide per record.

use serde_json::Value;

use crate::auth::Identity;
use crate::errors::{ApiError, ApiResult};
use crate::search::FilterExpr;

/// Record-level access capability
pub trait RecordAccess: Send + Sync {
    /// Whether `identity` may act on `record`
    fn check_access(&self, record: &Value, identity: Option<&Identity>) -> bool;
}

impl<F> RecordAccess for F
where
    F: Fn(&Value, Option<&Identity>) -> bool + Send + Sync,
{
    fn check_access(&self, record: &Value, identity: Option<&Identity>) -> bool {
        self(record, identity)
    }
}

/// Records owned through an attribute holding the identity ID
#[derive(Debug, Clone)]
pub struct OwnerAccess {
    owner_field: String,
}

impl OwnerAccess {
    pub fn new(owner_field: impl Into<String>) -> Self {
        Self {
            owner_field: owner_field.into(),
        }
    }

    /// List scope limiting results to the identity's own records
    pub fn scope(&self, identity: Option<&Identity>) -> FilterExpr {
        match identity {
            Some(identity) => FilterExpr::eq(self.owner_field.as_str(), Value::String(identity.id.clone())),
            // Nobody owns anything anonymously.
            None => FilterExpr::Or { filters: vec![] },
        }
    }
}

impl RecordAccess for OwnerAccess {
    fn check_access(&self, record: &Value, identity: Option<&Identity>) -> bool {
        match (identity, record.get(&self.owner_field)) {
            (Some(identity), Some(Value::String(owner))) => *owner == identity.id,
            (Some(identity), Some(Value::Number(owner))) => owner.to_string() == identity.id,
            _ => false,
        }
    }
}

/// Route-level rule: listed actions require one of the listed roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    actions: Vec<String>,
    roles: Vec<String>,
}

impl AccessRule {
    /// Rule applying to every action
    pub fn roles(roles: &[&str]) -> Self {
        Self {
            actions: Vec::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Restrict the rule to some action IDs
    pub fn on(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn applies_to(&self, action: &str) -> bool {
        self.actions.is_empty() || self.actions.iter().any(|a| a == action)
    }

    /// Reject identities holding none of the roles
    pub fn check(&self, action: &str, identity: Option<&Identity>) -> ApiResult<()> {
        if !self.applies_to(action) {
            return Ok(());
        }
        let allowed = identity
            .map(|identity| self.roles.iter().any(|role| identity.has_role(role)))
            .unwrap_or(false);
        if allowed {
            Ok(())
        } else {
            Err(ApiError::forbidden("You are not allowed to perform this action."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_owner_access() {
        let access = OwnerAccess::new("owner_id");
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");
        let record = json!({"id": 1, "owner_id": "alice"});

        assert!(access.check_access(&record, Some(&alice)));
        assert!(!access.check_access(&record, Some(&bob)));
        assert!(!access.check_access(&record, None));
    }

    #[test]
    fn test_owner_scope() {
        let access = OwnerAccess::new("owner_id");
        let alice = Identity::new("alice");
        let scope = access.scope(Some(&alice));

        assert!(scope.matches(&json!({"owner_id": "alice"})));
        assert!(!scope.matches(&json!({"owner_id": "bob"})));
        assert!(!access.scope(None).matches(&json!({"owner_id": "alice"})));
    }

    #[test]
    fn test_closure_record_access() {
        let access = |record: &Value, _: Option<&Identity>| record["public"] == json!(true);
        assert!(access.check_access(&json!({"public": true}), None));
        assert!(!access.check_access(&json!({"public": false}), None));
    }

    #[test]
    fn test_access_rule() {
        let rule = AccessRule::roles(&["admin"]).on(&["delete"]);
        let admin = Identity::new("root").with_role("admin");
        let user = Identity::new("joe");

        assert!(rule.check("delete", Some(&admin)).is_ok());
        assert!(rule.check("delete", Some(&user)).is_err());
        assert!(rule.check("delete", None).is_err());
        assert!(rule.check("view", Some(&user)).is_ok());
    }
}
