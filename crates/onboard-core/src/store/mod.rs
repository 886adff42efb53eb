//! Persistence adapters for [`ProgressionRecord`]s.
//!
//! The engine only needs two calls, `load` and `save`, keyed by the session
//! principal. Saves are last-write-wins; there is no version column and no
//! compare-and-swap, so two tabs racing on one principal both succeed and
//! the later write is what the next `resume` sees.
//!
//! - [`MemoryStore`]: in-process map, for tests and single-process callers
//! - [`SqliteStore`]: one SQLite row per principal

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::Result, models::ProgressionRecord};

mod database;
pub mod memory;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, SqliteStoreBuilder};

/// Durable storage for onboarding progress.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Loads the record for `principal`; `None` means never started.
    async fn load(&self, principal: &str) -> Result<Option<ProgressionRecord>>;

    /// Replaces the record for `principal`.
    async fn save(&self, principal: &str, record: &ProgressionRecord) -> Result<()>;
}

#[async_trait]
impl<S: ProgressStore + ?Sized> ProgressStore for Arc<S> {
    async fn load(&self, principal: &str) -> Result<Option<ProgressionRecord>> {
        (**self).load(principal).await
    }

    async fn save(&self, principal: &str, record: &ProgressionRecord) -> Result<()> {
        (**self).save(principal, record).await
    }
}
