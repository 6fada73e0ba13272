//! In-memory `DocumentStore` used by the ingestion loop and route tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::store::{DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(self, doc_id: &str, doc: Value) -> Self {
        self.docs
            .lock()
            .unwrap()
            .insert(doc_id.to_string(), doc);
        self
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.docs.lock().unwrap().contains_key(doc_id)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_database(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn exists(&self, doc_id: &str) -> Result<bool, StoreError> {
        Ok(self.docs.lock().unwrap().contains_key(doc_id))
    }

    async fn insert(&self, doc_id: &str, doc: &Value) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().unwrap();
        if docs.contains_key(doc_id) {
            return Err(StoreError::Conflict(doc_id.to_string()));
        }
        docs.insert(doc_id.to_string(), doc.clone());
        Ok(())
    }

    async fn get(&self, doc_id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.lock().unwrap().get(doc_id).cloned())
    }

    async fn find(
        &self,
        selector: Value,
        _fields: Option<&[&str]>,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let selector = selector.as_object().cloned().unwrap_or_default();
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .values()
            .filter(|doc| matches_selector(doc, &selector))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Just enough of the Cloudant selector language for the routes under test:
/// equality, `$regex` (literal `(?i)`-prefixed substrings), `$in`,
/// `$elemMatch`, and top-level `$or`.
fn matches_selector(doc: &Value, selector: &Map<String, Value>) -> bool {
    selector.iter().all(|(key, want)| {
        if key == "$or" {
            want.as_array().is_some_and(|clauses| {
                clauses
                    .iter()
                    .filter_map(Value::as_object)
                    .any(|clause| matches_selector(doc, clause))
            })
        } else {
            matches_field(doc.get(key), want)
        }
    })
}

fn matches_field(have: Option<&Value>, want: &Value) -> bool {
    let ops = match want.as_object() {
        Some(obj) if obj.keys().any(|k| k.starts_with('$')) => obj,
        _ => return have == Some(want),
    };
    ops.iter().all(|(op, arg)| match op.as_str() {
        "$regex" => have
            .and_then(Value::as_str)
            .is_some_and(|s| regex_contains(s, arg)),
        "$in" => arg
            .as_array()
            .is_some_and(|options| have.is_some_and(|h| options.contains(h))),
        "$elemMatch" => have
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|item| matches_field(Some(item), arg))),
        _ => false,
    })
}

fn regex_contains(haystack: &str, pattern: &Value) -> bool {
    let Some(pattern) = pattern.as_str() else {
        return false;
    };
    let needle = pattern.strip_prefix("(?i)").unwrap_or(pattern);
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
