//! # Record Store
//!
//! The storage capability the REST layer runs on top of. Query execution
//! and persistence belong to implementations; the REST layer only builds
//! queries and resolves keys.

pub mod errors;
pub mod key;
pub mod memory;

pub use errors::{StoreError, StoreResult};
pub use key::{scalar_to_string, KeyError, RecordKey, DEFAULT_KEY_DELIMITER};
pub use memory::InMemoryStore;

use serde_json::{Map, Value};

use crate::search::FilterExpr;

/// A list query: filter plus window
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub filter: FilterExpr,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Query matching every record
    pub fn all() -> Self {
        Self {
            filter: FilterExpr::All,
            offset: 0,
            limit: None,
        }
    }

    /// Narrow the query; never widens it
    pub fn and_where(mut self, filter: FilterExpr) -> Self {
        self.filter = self.filter.and(filter);
        self
    }

    /// Skip the first `offset` matches
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Return at most `limit` matches
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self::all()
    }
}

/// One window of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records in the window, in store order
    pub records: Vec<Value>,
    /// Total number of matches ignoring the window
    pub total: usize,
}

/// Typed record store
pub trait RecordStore: Send + Sync {
    /// Resource name, used in messages and logs
    fn name(&self) -> &str;

    /// Scalar attribute names of a blank record, in declaration order
    fn attributes(&self) -> Vec<String>;

    /// Primary key attribute names, in declaration order
    fn primary_key(&self) -> Vec<String>;

    /// Count matches of `query.filter` and return the requested window
    fn find(&self, query: &RecordQuery) -> StoreResult<Page>;

    /// Look up a single record by key
    fn find_one(&self, key: &RecordKey) -> StoreResult<Option<Value>>;

    /// Insert a new record, returning it as stored
    fn insert(&self, record: Value) -> StoreResult<Value>;

    /// Apply attribute changes to an existing record
    fn update(&self, key: &RecordKey, changes: &Map<String, Value>) -> StoreResult<Option<Value>>;

    /// Delete a record; `false` if nothing matched
    fn delete(&self, key: &RecordKey) -> StoreResult<bool>;
}
