//! Database module for persisting the pricing settings and the current job
//!
//! Uses SQLite as a small key-value store. Each object is kept as flat JSON
//! under a fixed key:
//! - `stumpcalc_settings_v1`: the pricing configuration
//! - `stumpcalc_job_v1`: the job being quoted
//!
//! Loading backfills missing fields from the defaults. Stored values that no
//! longer parse are discarded with a warning and the defaults are used.

use crate::core::{Job, PricingConfig, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Key holding the pricing configuration
pub const SETTINGS_KEY: &str = "stumpcalc_settings_v1";
/// Key holding the current job
pub const JOB_KEY: &str = "stumpcalc_job_v1";

/// Key-value store manager
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        let store = Self { conn };
        store.init_schema()?;

        log::debug!("Opened store at {}", path.display());
        Ok(store)
    }

    /// Open a throwaway store that lives only in memory
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Get the raw stored value for a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value)
    }

    /// Insert or replace the raw value for a key
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        self.conn.execute(
            r#"INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3"#,
            params![key, value, now],
        )?;

        Ok(())
    }

    /// Delete a key, returning whether it existed
    pub fn delete(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    pub fn load_settings(&self) -> Result<PricingConfig> {
        self.load_or_default(SETTINGS_KEY, "settings")
    }

    pub fn save_settings(&self, settings: &PricingConfig) -> Result<()> {
        self.save_json(SETTINGS_KEY, settings)
    }

    pub fn load_job(&self) -> Result<Job> {
        self.load_or_default(JOB_KEY, "job")
    }

    pub fn save_job(&self, job: &Job) -> Result<()> {
        self.save_json(JOB_KEY, job)
    }

    /// Replace the stored job with a fresh one and return it
    pub fn reset_job(&self) -> Result<Job> {
        let job = Job::new();
        self.save_job(&job)?;
        log::info!("Started new job {}", job.id);
        Ok(job)
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.put(key, &json)
    }

    fn load_or_default<T>(&self, key: &str, what: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.get(key)? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Failed to parse saved {}, using defaults: {}", what, e);
                Ok(T::default())
            }
        }
    }
}
