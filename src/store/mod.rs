//! Result Store collaborator boundary.
//!
//! The executor only produces a [`ProbeResult`]; durable persistence lives
//! behind this trait. Store failures are the store's to report and propagate
//! through its caller, never through `execute`.

use std::sync::Mutex;

use thiserror::Error;

use crate::probe::result::ProbeResult;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize probe result: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Accepts finished probe records for persistence.
pub trait ResultStore {
    fn create(&self, result: &ProbeResult) -> Result<(), StoreError>;
}

/// In-memory store for tests and short-lived embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<serde_json::Value> {
        self.records.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl ResultStore for MemoryStore {
    fn create(&self, result: &ProbeResult) -> Result<(), StoreError> {
        let record = serde_json::to_value(result)?;
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn memory_store_keeps_serialized_records() {
        let store = MemoryStore::new();
        let result = ProbeResult {
            url: "https://example.test/".to_string(),
            method: "GET".to_string(),
            status_code: 204,
            response_body: String::new(),
            response_headers: BTreeMap::new(),
            request_headers: BTreeMap::new(),
            request_params: None,
            request_body: None,
            username: None,
            password: None,
            user_id: Some("42".to_string()),
            assertions: None,
        };
        store.create(&result).unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["status_code"], 204);
        assert_eq!(records[0]["user_id"], "42");
    }

    #[test]
    fn records_survive_a_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.records.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert!(store.records().is_empty());
    }
}
