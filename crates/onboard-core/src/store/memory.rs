//! In-process store.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ProgressStore;
use crate::{error::Result, models::ProgressionRecord};

/// Keeps records in a map; contents are lost with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ProgressionRecord>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one record.
    pub fn with_record(principal: impl Into<String>, record: ProgressionRecord) -> Self {
        Self {
            records: RwLock::new(HashMap::from([(principal.into(), record)])),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load(&self, principal: &str) -> Result<Option<ProgressionRecord>> {
        Ok(self.records.read().await.get(principal).cloned())
    }

    async fn save(&self, principal: &str, record: &ProgressionRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(principal.to_string(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepId;

    #[tokio::test]
    async fn test_missing_principal_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load("nobody").await.unwrap().is_none());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryStore::new();
        let mut record = ProgressionRecord::new();
        store.save("alice", &record).await.unwrap();

        record.current_step = StepId::BusinessInfo;
        store.save("alice", &record).await.unwrap();

        let loaded = store.load("alice").await.unwrap().unwrap();
        assert_eq!(loaded.current_step, StepId::BusinessInfo);
        assert_eq!(store.writes(), 2);
    }
}
