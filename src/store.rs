// Key-value persistence for drafts and reviewer settings.
//
// The studio only ever needs string-keyed get/set of serialized payloads, so
// the storage boundary is a narrow trait. The SQLite implementation is the
// production backend; the in-memory one backs tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

// ---------------------------------------------------------------------------
// Key construction
// ---------------------------------------------------------------------------

/// Prefix for per-prompt draft slots. Versioned so a future payload change
/// can migrate by switching prefixes without clobbering old drafts.
pub const DRAFT_KEY_PREFIX: &str = "practice-draft-v1";

/// Storage key for the reviewer API credential.
pub const REVIEWER_KEY_SLOT: &str = "practice:reviewer-key";

/// Storage key for the reviewer model identifier.
pub const REVIEWER_MODEL_SLOT: &str = "practice:reviewer-model";

/// The storage key for one prompt's draft slot: `<prefix>:<prompt_id>`.
pub fn draft_key(prompt_id: &str) -> String {
    format!("{DRAFT_KEY_PREFIX}:{prompt_id}")
}

// ---------------------------------------------------------------------------
// DraftStore trait
// ---------------------------------------------------------------------------

/// String-keyed persistence. Absent keys are `Ok(None)`, not errors; write
/// failures are errors the caller reports and survives.
pub trait DraftStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// SQLite-backed store: a single key-value table, one row per slot,
/// overwritten on every save.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the table exists.
    /// Pass `":memory:"` for an ephemeral database (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open draft store at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set draft store pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS drafts (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create draft store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection. Panics if the mutex is poisoned (another
    /// thread panicked while holding the lock), which should never happen
    /// in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("draft store mutex poisoned")
    }
}

impl DraftStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM drafts WHERE key = ?1")
            .context("failed to prepare draft load query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query draft slot")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read draft row")?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO drafts (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .context("failed to save draft slot")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store for tests and sessions where durability isn't needed.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of populated slots (test helper).
    pub fn len(&self) -> usize {
        self.slots.lock().expect("memory store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DraftStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .slots
            .lock()
            .expect("memory store mutex poisoned")
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .lock()
            .expect("memory store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
