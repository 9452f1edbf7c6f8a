//! Append-only audit history of analyzed sentences.
//!
//! Every analyzed sentence can be persisted with its extraction result,
//! keyed by a digest of (text, language). The store is write-only from
//! the pipeline's point of view: nothing reads it back during analysis.

use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::extract::{Language, SvoResult};

/// SQLite-backed audit store.
pub struct SqliteHistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryStore {
    /// Open or create a history store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::History(e.to_string()))?;
        Self::initialize(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::History(e.to_string()))?;
        Self::initialize(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS analyzed_sentences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                digest TEXT NOT NULL,
                text TEXT NOT NULL,
                language TEXT NOT NULL,
                result TEXT NOT NULL,
                method TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_analyzed_digest
                ON analyzed_sentences (digest);",
        )
        .map_err(|e| Error::History(e.to_string()))
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| Error::Internal(format!("Failed to lock connection: {}", e)))?;
        f(&conn).map_err(|e| Error::History(e.to_string()))
    }

    fn digest(text: &str, language: Language) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(language.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Append one analyzed sentence. Rows are never updated or deleted.
    pub fn record(&self, text: &str, language: Language, svo: &SvoResult) -> Result<()> {
        let result = serde_json::to_string(svo)?;
        let digest = Self::digest(text, language);
        let created_at = Utc::now().to_rfc3339();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO analyzed_sentences
                    (digest, text, language, result, method, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    digest,
                    text,
                    language.to_string(),
                    result,
                    svo.method.to_string(),
                    created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Number of stored rows. Only used by tooling and tests; the
    /// pipeline never reads the store.
    pub fn len(&self) -> Result<usize> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM analyzed_sentences", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractionMethod, PredicateType};

    fn svo() -> SvoResult {
        SvoResult::new(
            "학생이",
            "읽다",
            Some("책을".to_string()),
            PredicateType::Verb,
            ExtractionMethod::SemanticRoles,
            Language::Korean,
        )
    }

    #[test]
    fn test_record_appends() {
        let store = SqliteHistoryStore::in_memory().expect("store");
        assert!(store.is_empty().expect("empty"));

        store.record("학생이 책을 읽는다.", Language::Korean, &svo()).expect("record");
        store.record("학생이 책을 읽는다.", Language::Korean, &svo()).expect("record");

        // Append-only: repeated analyses of the same sentence are all kept.
        assert_eq!(store.len().expect("len"), 2);
    }

    #[test]
    fn test_digest_distinguishes_language() {
        let ko = SqliteHistoryStore::digest("text", Language::Korean);
        let en = SqliteHistoryStore::digest("text", Language::English);
        assert_ne!(ko, en);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.sqlite");

        let store = SqliteHistoryStore::open(&path).expect("store");
        store.record("문장이다.", Language::Korean, &svo()).expect("record");
        drop(store);

        let reopened = SqliteHistoryStore::open(&path).expect("store");
        assert_eq!(reopened.len().expect("len"), 1);
    }
}
