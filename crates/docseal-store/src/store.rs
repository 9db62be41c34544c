// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document records backed by SQLite.
//
// Each row holds the textual fields of a document together with the signed
// PDF the pipeline produced from them. Ids are caller-assigned and never
// reused by the store itself.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use tracing::{debug, info, instrument};

use docseal_core::error::{DocsealError, Result};
use docseal_core::types::{DocumentId, DocumentSummary, StoredDocument};

/// SQLite schema for the documents table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        pdf BLOB NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

const SELECT_COLUMNS: &str = "id, title, content, pdf, created_at, updated_at";

/// Document records in a single SQLite database.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively. In an async context, wrap calls in `tokio::task::spawn_blocking`.
/// The connection is not `Sync`; share the store behind a mutex.
pub struct DocumentStore {
    conn: Connection,
}

impl DocumentStore {
    /// Open (or create) the record database at the given path.
    ///
    /// Applies WAL journal mode and creates the `documents` table if it does
    /// not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db("open"))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db("WAL pragma"))?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(db("create table"))?;

        info!("document database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db("open in-memory"))?;
        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(db("create table"))?;

        debug!("in-memory document database opened");
        Ok(Self { conn })
    }

    /// Insert a new record. An existing row with the same id is a
    /// [`DocsealError::Conflict`].
    #[instrument(skip(self, document), fields(id = %document.id, pdf_len = document.pdf.len()))]
    pub fn insert(&self, document: &StoredDocument) -> Result<()> {
        let inserted = self.conn.execute(
            "INSERT INTO documents (id, title, content, pdf, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                document.id.0,
                document.title,
                document.content,
                document.pdf,
                document.created_at.to_rfc3339(),
                document.updated_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                info!(id = %document.id, "document inserted");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(DocsealError::Conflict(document.id))
            }
            Err(e) => Err(db("insert document")(e)),
        }
    }

    /// Fetch one record. Ids below 1 are never stored and return `None`.
    #[instrument(skip(self))]
    pub fn get(&self, id: DocumentId) -> Result<Option<StoredDocument>> {
        if !id.is_valid() {
            return Ok(None);
        }

        self.conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM documents WHERE id = ?1"),
                params![id.0],
                row_to_document,
            )
            .optional()
            .map_err(db("get document"))
    }

    /// Overwrite title, content and PDF of an existing record.
    ///
    /// `created_at` is preserved; `updated_at` is set to the current time and
    /// returned.
    #[instrument(skip(self, document), fields(id = %document.id, pdf_len = document.pdf.len()))]
    pub fn update(&self, document: &StoredDocument) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let rows = self
            .conn
            .execute(
                "UPDATE documents SET title = ?1, content = ?2, pdf = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    document.title,
                    document.content,
                    document.pdf,
                    now.to_rfc3339(),
                    document.id.0,
                ],
            )
            .map_err(db("update document"))?;

        if rows == 0 {
            return Err(DocsealError::NotFound(document.id));
        }

        debug!(id = %document.id, "document updated");
        Ok(now)
    }

    /// Delete a record. A missing row is [`DocsealError::NotFound`].
    #[instrument(skip(self))]
    pub fn delete(&self, id: DocumentId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id.0])
            .map_err(db("delete document"))?;

        if rows == 0 {
            return Err(DocsealError::NotFound(id));
        }

        info!(id = %id, "document deleted");
        Ok(())
    }

    /// All records ordered by id, without their PDF payloads.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<DocumentSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, content FROM documents ORDER BY id ASC")
            .map_err(db("prepare list"))?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(DocumentSummary {
                    id: DocumentId(row.get(0)?),
                    title: row.get(1)?,
                    content: row.get(2)?,
                })
            })
            .map_err(db("query list"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db("collect rows"))?;

        debug!(count = summaries.len(), "listed documents");
        Ok(summaries)
    }
}

/// Wrap a rusqlite error with the operation it came from.
fn db(operation: &'static str) -> impl Fn(rusqlite::Error) -> DocsealError {
    move |e| DocsealError::Database(format!("{operation}: {e}"))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Map a SQLite row to a `StoredDocument`.
///
/// Column indices must match [`SELECT_COLUMNS`].
fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDocument> {
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(StoredDocument {
        id: DocumentId(row.get(0)?),
        title: row.get(1)?,
        content: row.get(2)?,
        pdf: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
        updated_at: parse_timestamp(5, &updated_at)?,
    })
}

fn parse_timestamp(column: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docseal_core::types::Document;

    fn record(id: i64, title: &str) -> StoredDocument {
        StoredDocument::new(Document::new(id, title, "body"), b"%PDF-1.7 fake".to_vec())
    }

    #[test]
    fn insert_and_retrieve() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        let doc = record(1, "Invoice");
        store.insert(&doc).expect("insert");

        let fetched = store.get(DocumentId(1)).expect("get").expect("found");
        assert_eq!(fetched.title, "Invoice");
        assert_eq!(fetched.content, "body");
        assert_eq!(fetched.pdf, doc.pdf);
        assert_eq!(fetched.created_at, doc.created_at);
    }

    #[test]
    fn duplicate_id_is_a_conflict() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        store.insert(&record(5, "first")).expect("insert");

        let err = store.insert(&record(5, "second")).unwrap_err();
        assert!(matches!(err, DocsealError::Conflict(DocumentId(5))));
        assert_eq!(store.get(DocumentId(5)).unwrap().unwrap().title, "first");
    }

    #[test]
    fn ids_below_one_are_never_found() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        assert!(store.get(DocumentId(0)).unwrap().is_none());
        assert!(store.get(DocumentId(-3)).unwrap().is_none());
    }

    #[test]
    fn update_bumps_updated_at_and_keeps_created_at() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        let mut doc = record(2, "draft");
        store.insert(&doc).expect("insert");

        doc.title = "final".into();
        doc.pdf = b"%PDF-1.7 other".to_vec();
        let updated_at = store.update(&doc).expect("update");

        let fetched = store.get(DocumentId(2)).unwrap().unwrap();
        assert_eq!(fetched.title, "final");
        assert_eq!(fetched.pdf, b"%PDF-1.7 other");
        assert_eq!(fetched.created_at, doc.created_at);
        assert_eq!(fetched.updated_at, updated_at);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        let err = store.update(&record(9, "ghost")).unwrap_err();
        assert!(matches!(err, DocsealError::NotFound(DocumentId(9))));
    }

    #[test]
    fn delete_removes_and_then_reports_not_found() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        store.insert(&record(3, "x")).expect("insert");

        store.delete(DocumentId(3)).expect("delete");
        assert!(store.get(DocumentId(3)).unwrap().is_none());
        assert!(matches!(
            store.delete(DocumentId(3)),
            Err(DocsealError::NotFound(DocumentId(3)))
        ));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let store = DocumentStore::open_in_memory().expect("open in-memory db");
        store.insert(&record(10, "ten")).unwrap();
        store.insert(&record(2, "two")).unwrap();
        store.insert(&record(7, "seven")).unwrap();

        let ids: Vec<i64> = store.list().unwrap().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![2, 7, 10]);
    }

    #[test]
    fn records_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db");
        {
            let store = DocumentStore::open(&path).expect("open");
            store.insert(&record(4, "persisted")).unwrap();
        }
        let store = DocumentStore::open(&path).expect("reopen");
        assert_eq!(store.get(DocumentId(4)).unwrap().unwrap().title, "persisted");
    }
}
