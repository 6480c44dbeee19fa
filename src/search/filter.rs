//! # Filter Expression AST
//!
//! Boolean filter trees evaluated against JSON records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::scalar_to_string;

/// A filter expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterExpr {
    /// Matches every record
    All,

    /// Every child must match
    And { filters: Vec<FilterExpr> },

    /// At least one child must match
    Or { filters: Vec<FilterExpr> },

    /// Case-sensitive substring containment on a scalar attribute
    Contains { field: String, term: String },

    /// Exact equality on an attribute
    Eq { field: String, value: Value },
}

impl Default for FilterExpr {
    fn default() -> Self {
        Self::All
    }
}

impl FilterExpr {
    /// Create a containment filter
    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            term: term.into(),
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::Eq {
            field: field.into(),
            value,
        }
    }

    /// Whether this expression places no restriction
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Narrow this expression by another one.
    ///
    /// `All` is the identity, nested conjunctions are flattened.
    pub fn and(self, other: FilterExpr) -> FilterExpr {
        match (self, other) {
            (FilterExpr::All, other) => other,
            (this, FilterExpr::All) => this,
            (FilterExpr::And { mut filters }, FilterExpr::And { filters: more }) => {
                filters.extend(more);
                FilterExpr::And { filters }
            }
            (FilterExpr::And { mut filters }, other) => {
                filters.push(other);
                FilterExpr::And { filters }
            }
            (this, other) => FilterExpr::And {
                filters: vec![this, other],
            },
        }
    }

    /// Check if a record matches this filter
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            FilterExpr::All => true,
            FilterExpr::And { filters } => filters.iter().all(|f| f.matches(record)),
            FilterExpr::Or { filters } => filters.iter().any(|f| f.matches(record)),
            FilterExpr::Contains { field, term } => record
                .get(field)
                .and_then(scalar_to_string)
                .map(|value| value.contains(term.as_str()))
                .unwrap_or(false),
            FilterExpr::Eq { field, value } => record.get(field) == Some(value),
        }
    }
}
