//! # In-Memory Record Store
//!
//! `RecordStore` over a vector of JSON objects. Records keep insertion
//! order, which is the default list ordering.

use std::sync::RwLock;

use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::key::RecordKey;
use super::{Page, RecordQuery, RecordStore};

/// In-memory store for one resource type
#[derive(Debug)]
pub struct InMemoryStore {
    name: String,
    attributes: Vec<String>,
    primary_key: Vec<String>,
    records: RwLock<Vec<Value>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new(name: impl Into<String>, attributes: &[&str], primary_key: &[&str]) -> Self {
        Self::from_parts(
            name,
            attributes.iter().map(|s| s.to_string()).collect(),
            primary_key.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create an empty store from owned attribute lists
    pub fn from_parts(name: impl Into<String>, attributes: Vec<String>, primary_key: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attributes,
            primary_key,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Seed records, returning the store
    pub fn with_records(self, records: Vec<Value>) -> StoreResult<Self> {
        for record in records {
            self.insert(record)?;
        }
        Ok(self)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(&self) -> StoreError {
        StoreError::Unavailable(format!("{}: lock poisoned", self.name))
    }
}

impl RecordStore for InMemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> Vec<String> {
        self.attributes.clone()
    }

    fn primary_key(&self) -> Vec<String> {
        self.primary_key.clone()
    }

    fn find(&self, query: &RecordQuery) -> StoreResult<Page> {
        let records = self.records.read().map_err(|_| self.poisoned())?;

        let matched: Vec<&Value> = records
            .iter()
            .filter(|r| query.filter.matches(r))
            .collect();
        let total = matched.len();
        let window = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Page {
            records: window,
            total,
        })
    }

    fn find_one(&self, key: &RecordKey) -> StoreResult<Option<Value>> {
        let records = self.records.read().map_err(|_| self.poisoned())?;
        Ok(records.iter().find(|r| key.matches(r)).cloned())
    }

    fn insert(&self, mut record: Value) -> StoreResult<Value> {
        let obj = record
            .as_object_mut()
            .ok_or_else(|| StoreError::InvalidRecord("record must be an object".to_string()))?;

        // Single-attribute keys are generated when absent.
        if let [only] = self.primary_key.as_slice() {
            if obj.get(only).map(Value::is_null).unwrap_or(true) {
                obj.insert(only.clone(), Value::String(Uuid::new_v4().to_string()));
            }
        }

        let key = RecordKey::from_record(&record, &self.primary_key).ok_or_else(|| {
            StoreError::InvalidRecord(format!(
                "missing primary key attributes: {}",
                self.primary_key.join(", ")
            ))
        })?;

        let mut records = self.records.write().map_err(|_| self.poisoned())?;
        if records.iter().any(|r| key.matches(r)) {
            return Err(StoreError::Conflict(key.encode(",")));
        }
        records.push(record.clone());
        Ok(record)
    }

    fn update(&self, key: &RecordKey, changes: &Map<String, Value>) -> StoreResult<Option<Value>> {
        let mut records = self.records.write().map_err(|_| self.poisoned())?;

        let Some(record) = records.iter_mut().find(|r| key.matches(r)) else {
            return Ok(None);
        };
        if let Some(obj) = record.as_object_mut() {
            for (attr, value) in changes {
                // Primary key attributes are immutable through update.
                if self.primary_key.contains(attr) {
                    continue;
                }
                obj.insert(attr.clone(), value.clone());
            }
        }
        Ok(Some(record.clone()))
    }

    fn delete(&self, key: &RecordKey) -> StoreResult<bool> {
        let mut records = self.records.write().map_err(|_| self.poisoned())?;
        let before = records.len();
        records.retain(|r| !key.matches(r));
        Ok(records.len() != before)
    }
}
