//! Persistent SQLite store for consultation records.

use rusqlite::{Connection, params};
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// One persisted symptom query and its AI-generated diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct Consultation {
    pub id: i64,
    /// The sender's messaging address, e.g. "whatsapp:+15551234567".
    pub user_id: String,
    pub input_text: String,
    pub diagnosis_text: String,
    /// UTC, "%Y-%m-%d %H:%M:%S".
    pub created_at: String,
}

/// Datastore read/write failure.
#[derive(Debug)]
pub enum StorageError {
    Open { path: String, source: rusqlite::Error },
    Write(rusqlite::Error),
    Read(rusqlite::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open database '{}': {}", path, source)
            }
            Self::Write(e) => write!(f, "database write failed: {}", e),
            Self::Read(e) => write!(f, "database read failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Write(e) | Self::Read(e) => Some(e),
        }
    }
}

/// Append-only consultation store. Records are never mutated or deleted.
pub struct ConsultationStore {
    conn: Mutex<Connection>,
}

impl ConsultationStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;

        let count = store.count()?;
        info!("Loaded consultation store from {:?} ({} records)", path, count);
        Ok(store)
    }

    /// Create an in-memory store (tests).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Open {
            path: ":memory:".to_string(),
            source: e,
        })?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS consultations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                input_text TEXT NOT NULL,
                diagnosis_text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_consultations_user_id ON consultations(user_id);
            CREATE INDEX IF NOT EXISTS idx_consultations_created_at ON consultations(created_at);
        "#,
        )
        .map_err(StorageError::Write)
    }

    /// Append a consultation record, assigning its id and timestamp.
    pub fn save(
        &self,
        user_id: &str,
        input_text: &str,
        diagnosis_text: &str,
    ) -> Result<Consultation, StorageError> {
        let created_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO consultations (user_id, input_text, diagnosis_text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, input_text, diagnosis_text, created_at],
        )
        .map_err(StorageError::Write)?;

        let id = conn.last_insert_rowid();
        info!("💾 Saved consultation {} for {}", id, user_id);

        Ok(Consultation {
            id,
            user_id: user_id.to_string(),
            input_text: input_text.to_string(),
            diagnosis_text: diagnosis_text.to_string(),
            created_at,
        })
    }

    /// Up to `limit` most recent consultations for a user, newest-first.
    /// Returns an empty vec when the user has no history.
    pub fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Consultation>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, input_text, diagnosis_text, created_at
                 FROM consultations
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(StorageError::Read)?;

        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(Consultation {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    input_text: row.get(2)?,
                    diagnosis_text: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(StorageError::Read)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::Read)
    }

    /// Total record count.
    pub fn count(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM consultations", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .map_err(StorageError::Read)
    }
}
