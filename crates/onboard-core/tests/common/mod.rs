use onboard_core::{SqliteStore, StepData};
use tempfile::TempDir;

/// Helper function to create a store backed by a temporary database
pub async fn create_test_store() -> (TempDir, SqliteStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::builder()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

/// Converts a JSON object literal into step data
pub fn step_data(value: serde_json::Value) -> StepData {
    value.as_object().cloned().unwrap_or_default()
}
