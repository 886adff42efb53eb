//! SQLite-backed [`ProgressStore`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::task;

use super::{Database, ProgressStore};
use crate::{
    error::{OnboardingError, Result},
    models::ProgressionRecord,
};

/// Stores one row per principal in a SQLite file.
///
/// Each call opens its own connection on the blocking pool, so the store is
/// cheap to clone and share.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn builder() -> SqliteStoreBuilder {
        SqliteStoreBuilder::new()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Deletes the record for `principal`, returning whether one existed.
    pub async fn delete(&self, principal: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let principal = principal.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.delete_record(&principal)
        })
        .await
        .map_err(OnboardingError::join)?
    }
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn load(&self, principal: &str) -> Result<Option<ProgressionRecord>> {
        let db_path = self.db_path.clone();
        let principal = principal.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.load_record(&principal)
        })
        .await
        .map_err(OnboardingError::join)?
    }

    async fn save(&self, principal: &str, record: &ProgressionRecord) -> Result<()> {
        let db_path = self.db_path.clone();
        let principal = principal.to_string();
        let record = record.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.save_record(&principal, &record)
        })
        .await
        .map_err(OnboardingError::join)?
    }
}

/// Builder for creating and configuring [`SqliteStore`] instances.
#[derive(Debug, Clone, Default)]
pub struct SqliteStoreBuilder {
    database_path: Option<PathBuf>,
}

impl SqliteStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/onboard/onboard.db` or `~/.local/share/onboard/onboard.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the store, creating the parent directory and schema.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::FileSystem` if the parent directory cannot be
    /// created and `OnboardingError::Database` if schema setup fails.
    pub async fn build(self) -> Result<SqliteStore> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OnboardingError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || Database::new(&db_path_clone).map(|_| ()))
            .await
            .map_err(OnboardingError::join)??;

        Ok(SqliteStore { db_path })
    }

    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("onboard")
            .place_data_file("onboard.db")
            .map_err(|e| OnboardingError::XdgDirectory(e.to_string()))
    }
}
