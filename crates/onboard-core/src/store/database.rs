//! SQLite connection, schema management and record queries.

use std::{path::Path, str::FromStr};

use jiff::Timestamp;
use rusqlite::{params, types::Type, Connection, OptionalExtension};

use crate::{
    error::{DatabaseResultExt, Result},
    models::{BillingCycle, Milestone, ProgressionRecord, StepData, StepId, Tier},
};

const SELECT_RECORD_SQL: &str = "SELECT current_step, selected_plan, billing_cycle, completed_steps, step_data, payment_pending, payment_id, subscription_id, started_at, completed_at, last_updated, last_error, last_payment_error FROM progress WHERE principal = ?1";
const UPSERT_RECORD_SQL: &str = "INSERT INTO progress (principal, current_step, selected_plan, billing_cycle, completed_steps, step_data, payment_pending, payment_id, subscription_id, started_at, completed_at, last_updated, last_error, last_payment_error) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
     ON CONFLICT(principal) DO UPDATE SET current_step = excluded.current_step, selected_plan = excluded.selected_plan, billing_cycle = excluded.billing_cycle, completed_steps = excluded.completed_steps, step_data = excluded.step_data, payment_pending = excluded.payment_pending, payment_id = excluded.payment_id, subscription_id = excluded.subscription_id, started_at = excluded.started_at, completed_at = excluded.completed_at, last_updated = excluded.last_updated, last_error = excluded.last_error, last_payment_error = excluded.last_payment_error";
const DELETE_RECORD_SQL: &str = "DELETE FROM progress WHERE principal = ?1";

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens a connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<()> {
        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")
    }

    /// Loads the record stored for `principal`.
    pub fn load_record(&self, principal: &str) -> Result<Option<ProgressionRecord>> {
        self.connection
            .query_row(SELECT_RECORD_SQL, params![principal], Self::build_record_from_row)
            .optional()
            .db_context("Failed to load progress record")
    }

    /// Inserts or replaces the record for `principal`.
    pub fn save_record(&self, principal: &str, record: &ProgressionRecord) -> Result<()> {
        let completed_steps = if record.completed_steps.is_empty() {
            None
        } else {
            let labels: Vec<&str> = record.completed_steps.iter().map(Milestone::as_str).collect();
            Some(labels.join(","))
        };
        let step_data = serde_json::to_string(&record.step_data)?;

        self.connection
            .execute(
                UPSERT_RECORD_SQL,
                params![
                    principal,
                    record.current_step.as_str(),
                    record.selected_plan.map(|t| t.as_str()),
                    record.billing_cycle.map(|c| c.as_str()),
                    completed_steps,
                    step_data,
                    record.payment_pending,
                    record.payment_id,
                    record.subscription_id,
                    record.started_at.map(|t| t.to_string()),
                    record.onboarding_completed_at.map(|t| t.to_string()),
                    record.last_updated.map(|t| t.to_string()),
                    record.last_error,
                    record.last_payment_error,
                ],
            )
            .db_context("Failed to save progress record")?;

        Ok(())
    }

    /// Removes the record for `principal`. Returns whether a row existed.
    pub fn delete_record(&self, principal: &str) -> Result<bool> {
        let removed = self
            .connection
            .execute(DELETE_RECORD_SQL, params![principal])
            .db_context("Failed to delete progress record")?;
        Ok(removed > 0)
    }

    fn build_record_from_row(row: &rusqlite::Row) -> rusqlite::Result<ProgressionRecord> {
        let completed_steps = row
            .get::<_, Option<String>>(3)?
            .map(|s| {
                s.split(',')
                    .map(|label| parse_column(3, label))
                    .collect::<rusqlite::Result<Vec<Milestone>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let step_data_str: String = row.get(4)?;
        let step_data: StepData = serde_json::from_str(&step_data_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(ProgressionRecord {
            current_step: parse_column::<StepId>(0, &row.get::<_, String>(0)?)?,
            selected_plan: parse_optional::<Tier>(row, 1)?,
            billing_cycle: parse_optional::<BillingCycle>(row, 2)?,
            completed_steps,
            step_data,
            payment_pending: row.get(5)?,
            payment_id: row.get(6)?,
            subscription_id: row.get(7)?,
            started_at: parse_timestamp(row, 8)?,
            onboarding_completed_at: parse_timestamp(row, 9)?,
            last_updated: parse_timestamp(row, 10)?,
            last_error: row.get(11)?,
            last_payment_error: row.get(12)?,
        })
    }
}

fn parse_column<T: FromStr<Err = String>>(idx: usize, value: &str) -> rusqlite::Result<T> {
    value
        .parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn parse_optional<T: FromStr<Err = String>>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| parse_column(idx, &s))
        .transpose()
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| {
            s.parse::<Timestamp>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_record_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("progress.db")).unwrap();

        let now = Timestamp::now();
        let record = ProgressionRecord {
            current_step: StepId::PaymentPending,
            selected_plan: Some(Tier::Enterprise),
            billing_cycle: Some(BillingCycle::Annual),
            completed_steps: vec![Milestone::BusinessInfo, Milestone::Subscription],
            step_data: json!({"businessName": "Acme"}).as_object().cloned().unwrap(),
            payment_pending: true,
            started_at: Some(now),
            last_updated: Some(now),
            last_payment_error: Some("card_declined".into()),
            ..Default::default()
        };

        db.save_record("alice", &record).unwrap();
        assert_eq!(db.load_record("alice").unwrap(), Some(record));
        assert_eq!(db.load_record("bob").unwrap(), None);
    }

    #[test]
    fn test_delete_record() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("progress.db")).unwrap();

        db.save_record("alice", &ProgressionRecord::new()).unwrap();
        assert!(db.delete_record("alice").unwrap());
        assert!(!db.delete_record("alice").unwrap());
    }

    #[test]
    fn test_fresh_schema_has_every_column() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("progress.db")).unwrap();

        let mut stmt = db
            .connection
            .prepare("SELECT name FROM pragma_table_info('progress')")
            .unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(columns.len(), 14);
        assert!(columns.iter().any(|c| c == "last_payment_error"));
    }

    #[test]
    fn test_reopening_applies_schema_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("progress.db");
        Database::new(&path).unwrap();
        let db = Database::new(&path).unwrap();
        db.save_record("alice", &ProgressionRecord::new()).unwrap();
    }
}
