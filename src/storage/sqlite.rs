//! SQLite storage backend

use super::traits::{ArticleStore, OpenStore, StorageError, StorageResult};
use crate::corpus::{
    Article, ArticleCounters, ArticleDraft, ArticleId, CounterSnapshot, LabelDraft, LabelRecord,
    SessionId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

const ARTICLE_COLUMNS: &str = "id, title, tokens_json, sentence_ends_json, paragraph_ends_json,
    in_quotes_json, label_counts_json, min_label_count, confidence_json, min_confidence,
    admin_only, created_at";

const SNAPSHOT_COLUMNS: &str = "id, admin_only, sentence_ends_json, paragraph_ends_json,
    label_counts_json, min_label_count, confidence_json, min_confidence";

const LABEL_COLUMNS: &str =
    "id, article_id, session_id, sentence_index, labels_json, authors_json, admin, created_at";

/// SQLite-backed article store
///
/// Arrays (tokens, boundaries, counters, labels) live in JSON columns and are
/// decoded into typed vectors on load. Thread-safe via internal mutex on the
/// connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                tokens_json TEXT NOT NULL,
                sentence_ends_json TEXT NOT NULL,
                paragraph_ends_json TEXT NOT NULL,
                in_quotes_json TEXT NOT NULL,
                label_counts_json TEXT NOT NULL,
                min_label_count INTEGER NOT NULL,
                confidence_json TEXT NOT NULL,
                min_confidence INTEGER NOT NULL,
                admin_only INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS label_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_id INTEGER NOT NULL,
                session_id TEXT NOT NULL,
                sentence_index INTEGER NOT NULL,
                labels_json TEXT NOT NULL,
                authors_json TEXT NOT NULL,
                admin INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (article_id) REFERENCES articles(id)
            );

            CREATE INDEX IF NOT EXISTS idx_labels_sentence
                ON label_records(article_id, sentence_index);
            CREATE INDEX IF NOT EXISTS idx_labels_session
                ON label_records(session_id);

            PRAGMA foreign_keys = ON;

            -- Concurrent reads (task selection) during writes (submissions)
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A panic while holding the connection cannot leave a half-applied
        // statement behind; SQLite rolls it back.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn parse_time(value: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(e.to_string()))
    }

    fn row_to_article(row: &Row<'_>) -> StorageResult<Article> {
        let id: i64 = row.get(0)?;
        let counters = ArticleCounters {
            label_counts: serde_json::from_str(&row.get::<_, String>(6)?)?,
            min_label_count: row.get(7)?,
            confidence: serde_json::from_str(&row.get::<_, String>(8)?)?,
            min_confidence: row.get(9)?,
        };
        Ok(Article {
            id: ArticleId::new(id as u64),
            title: row.get(1)?,
            tokens: serde_json::from_str(&row.get::<_, String>(2)?)?,
            sentence_ends: serde_json::from_str(&row.get::<_, String>(3)?)?,
            paragraph_ends: serde_json::from_str(&row.get::<_, String>(4)?)?,
            in_quotes: serde_json::from_str(&row.get::<_, String>(5)?)?,
            counters,
            admin_only: row.get(10)?,
            created_at: Self::parse_time(&row.get::<_, String>(11)?)?,
        })
    }

    fn row_to_snapshot(row: &Row<'_>) -> StorageResult<CounterSnapshot> {
        let id: i64 = row.get(0)?;
        Ok(CounterSnapshot {
            id: ArticleId::new(id as u64),
            admin_only: row.get(1)?,
            sentence_ends: serde_json::from_str(&row.get::<_, String>(2)?)?,
            paragraph_ends: serde_json::from_str(&row.get::<_, String>(3)?)?,
            counters: ArticleCounters {
                label_counts: serde_json::from_str(&row.get::<_, String>(4)?)?,
                min_label_count: row.get(5)?,
                confidence: serde_json::from_str(&row.get::<_, String>(6)?)?,
                min_confidence: row.get(7)?,
            },
        })
    }

    fn row_to_label(row: &Row<'_>) -> StorageResult<LabelRecord> {
        let article_id: i64 = row.get(1)?;
        let session: String = row.get(2)?;
        let sentence_index: i64 = row.get(3)?;
        Ok(LabelRecord {
            id: row.get(0)?,
            article_id: ArticleId::new(article_id as u64),
            session: session
                .parse()
                .map_err(|e| StorageError::Corrupt(format!("session id `{session}`: {e}")))?,
            sentence_index: sentence_index as usize,
            labels: serde_json::from_str(&row.get::<_, String>(4)?)?,
            authors: serde_json::from_str(&row.get::<_, String>(5)?)?,
            admin: row.get(6)?,
            created_at: Self::parse_time(&row.get::<_, String>(7)?)?,
        })
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ArticleStore for SqliteStore {
    // === Article Operations ===

    fn create_article(&self, draft: ArticleDraft) -> StorageResult<Article> {
        draft.validate()?;
        let created_at = Utc::now();
        let counters = ArticleCounters::new(draft.sentence_ends.len());
        let in_quotes = if draft.in_quotes.is_empty() {
            vec![false; draft.tokens.len()]
        } else {
            draft.in_quotes.clone()
        };

        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO articles (title, tokens_json, sentence_ends_json, paragraph_ends_json,
                                  in_quotes_json, label_counts_json, min_label_count,
                                  confidence_json, min_confidence, admin_only, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                draft.title,
                serde_json::to_string(&draft.tokens)?,
                serde_json::to_string(&draft.sentence_ends)?,
                serde_json::to_string(&draft.paragraph_ends)?,
                serde_json::to_string(&in_quotes)?,
                serde_json::to_string(&counters.label_counts)?,
                counters.min_label_count,
                serde_json::to_string(&counters.confidence)?,
                counters.min_confidence,
                draft.admin_only,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = ArticleId::new(conn.last_insert_rowid() as u64);

        Ok(draft.into_article(id, created_at))
    }

    fn get_article(&self, id: ArticleId) -> StorageResult<Option<Article>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"))?;
        let mut rows = stmt.query(params![id.get() as i64])?;
        let article = match rows.next()? {
            Some(row) => Some(Self::row_to_article(row)?),
            None => None,
        };
        Ok(article)
    }

    fn list_article_ids(&self) -> StorageResult<Vec<ArticleId>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id FROM articles ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(|id| ArticleId::new(id as u64)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn counter_snapshots(&self) -> StorageResult<Vec<CounterSnapshot>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT {SNAPSHOT_COLUMNS} FROM articles ORDER BY id"))?;
        let mut rows = stmt.query([])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(Self::row_to_snapshot(row)?);
        }
        Ok(snapshots)
    }

    fn save_article_counters(&self, id: ArticleId, counters: &ArticleCounters) -> StorageResult<()> {
        let conn = self.lock();
        let sentence_ends: Option<String> = conn
            .query_row(
                "SELECT sentence_ends_json FROM articles WHERE id = ?1",
                params![id.get() as i64],
                |row| row.get(0),
            )
            .optional()?;
        let Some(sentence_ends) = sentence_ends else {
            return Err(StorageError::ArticleNotFound(id));
        };
        let sentences = serde_json::from_str::<Vec<usize>>(&sentence_ends)?.len();
        if counters.label_counts.len() != sentences || counters.confidence.len() != sentences {
            return Err(StorageError::Corrupt(format!(
                "counter arrays for article {} do not match its {} sentences",
                id, sentences
            )));
        }

        let updated = conn.execute(
            r#"
            UPDATE articles SET
                label_counts_json = ?2,
                min_label_count = ?3,
                confidence_json = ?4,
                min_confidence = ?5
            WHERE id = ?1
            "#,
            params![
                id.get() as i64,
                serde_json::to_string(&counters.label_counts)?,
                counters.min_label_count,
                serde_json::to_string(&counters.confidence)?,
                counters.min_confidence,
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::ArticleNotFound(id));
        }
        Ok(())
    }

    // === Label Operations ===

    fn create_label_record(&self, draft: LabelDraft) -> StorageResult<LabelRecord> {
        let created_at = Utc::now();
        let conn = self.lock();

        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM articles WHERE id = ?1",
                params![draft.article_id.get() as i64],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::ArticleNotFound(draft.article_id));
        }

        conn.execute(
            r#"
            INSERT INTO label_records (article_id, session_id, sentence_index, labels_json,
                                       authors_json, admin, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                draft.article_id.get() as i64,
                draft.session.to_string(),
                draft.sentence_index as i64,
                serde_json::to_string(&draft.labels)?,
                serde_json::to_string(&draft.authors)?,
                draft.admin,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(draft.into_record(id, created_at))
    }

    fn list_label_records(&self, article: ArticleId, sentence: usize) -> StorageResult<Vec<LabelRecord>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LABEL_COLUMNS} FROM label_records
             WHERE article_id = ?1 AND sentence_index = ?2 ORDER BY id"
        ))?;
        let mut rows = stmt.query(params![article.get() as i64, sentence as i64])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Self::row_to_label(row)?);
        }
        Ok(records)
    }

    fn session_labels(&self, session: &SessionId) -> StorageResult<Vec<(ArticleId, usize)>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT article_id, sentence_index FROM label_records
             WHERE session_id = ?1 ORDER BY article_id, sentence_index",
        )?;
        let pairs = stmt
            .query_map(params![session.to_string()], |row| {
                Ok((
                    ArticleId::new(row.get::<_, i64>(0)? as u64),
                    row.get::<_, i64>(1)? as usize,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Annotator;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn create_test_draft() -> ArticleDraft {
        ArticleDraft {
            title: "Le football".to_string(),
            tokens: ["Platini", "dit", ":", "\"", "oui", "\"", ".", "Fin", "."]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            sentence_ends: vec![6, 8],
            paragraph_ends: vec![0, 1],
            in_quotes: vec![false, false, false, false, true, false, false, false, false],
            admin_only: true,
        }
    }

    #[test]
    fn test_save_and_load_article() {
        let store = create_test_store();
        let created = store.create_article(create_test_draft()).unwrap();

        let loaded = store.get_article(created.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Le football");
        assert_eq!(loaded.tokens.len(), 9);
        assert_eq!(loaded.sentence_ends, vec![6, 8]);
        assert_eq!(loaded.paragraph_ends, vec![0, 1]);
        assert!(loaded.in_quotes[4]);
        assert!(loaded.admin_only);
        assert_eq!(loaded.counters, ArticleCounters::new(2));
    }

    #[test]
    fn test_missing_article() {
        let store = create_test_store();
        assert!(store.get_article(ArticleId::new(7)).unwrap().is_none());
        assert!(matches!(
            store.save_article_counters(ArticleId::new(7), &ArticleCounters::new(1)),
            Err(StorageError::ArticleNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_draft_is_not_inserted() {
        let store = create_test_store();
        let mut draft = create_test_draft();
        draft.paragraph_ends = vec![1, 1];
        assert!(matches!(
            store.create_article(draft),
            Err(StorageError::InvalidArticle(_))
        ));
        assert!(store.list_article_ids().unwrap().is_empty());
    }

    #[test]
    fn test_counters_persist() {
        let store = create_test_store();
        let article = store.create_article(create_test_draft()).unwrap();

        let mut counters = article.counters.clone();
        counters.increment(0).unwrap();
        counters.replace_confidence(&[55, 80]).unwrap();
        store.save_article_counters(article.id, &counters).unwrap();

        let snapshot = store.counter_snapshots().unwrap().remove(0);
        assert_eq!(snapshot.id, article.id);
        assert_eq!(snapshot.counters.label_counts, vec![1, 0]);
        assert_eq!(snapshot.counters.min_label_count, 0);
        assert_eq!(snapshot.counters.confidence, vec![55, 80]);
        assert_eq!(snapshot.counters.min_confidence, 55);
    }

    #[test]
    fn test_counters_must_match_sentences() {
        let store = create_test_store();
        let article = store.create_article(create_test_draft()).unwrap();

        let mut counters = article.counters.clone();
        counters.replace_confidence(&[40, 60]).unwrap();
        store.save_article_counters(article.id, &counters).unwrap();

        assert!(matches!(
            store.save_article_counters(article.id, &ArticleCounters::new(3)),
            Err(StorageError::Corrupt(_))
        ));
        let mut uneven = ArticleCounters::new(2);
        uneven.confidence.push(0);
        assert!(matches!(
            store.save_article_counters(article.id, &uneven),
            Err(StorageError::Corrupt(_))
        ));
        assert!(matches!(
            store.save_article_counters(ArticleId::new(99), &counters),
            Err(StorageError::ArticleNotFound(_))
        ));

        let loaded = store.get_article(article.id).unwrap().unwrap();
        assert_eq!(loaded.counters.confidence, vec![40, 60]);
    }

    #[test]
    fn test_snapshots_are_ordered() {
        let store = create_test_store();
        let first = store.create_article(create_test_draft()).unwrap();
        let second = store.create_article(create_test_draft()).unwrap();

        let ids: Vec<_> = store.counter_snapshots().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(store.list_article_ids().unwrap(), ids);
    }

    #[test]
    fn test_label_records_roundtrip() {
        let store = create_test_store();
        let article = store.create_article(create_test_draft()).unwrap();
        let annotator = Annotator::admin(SessionId::new());

        let draft = LabelDraft {
            article_id: article.id,
            session: annotator.session,
            sentence_index: 0,
            labels: vec![0, 0, 0, 1, 1, 1, 0],
            authors: vec![0],
            admin: true,
        };
        let created = store.create_label_record(draft).unwrap();
        store
            .create_label_record(LabelDraft::undecided(article.id, 1, &annotator))
            .unwrap();

        let records = store.list_label_records(article.id, 0).unwrap();
        assert_eq!(records, vec![created]);
        assert!(records[0].has_reported_speech());

        let undecided = store.list_label_records(article.id, 1).unwrap();
        assert!(undecided[0].is_undecided());

        assert_eq!(
            store.session_labels(&annotator.session).unwrap(),
            vec![(article.id, 0), (article.id, 1)]
        );
        assert!(store.session_labels(&SessionId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_label_for_missing_article() {
        let store = create_test_store();
        let annotator = Annotator::new(SessionId::new());
        assert!(matches!(
            store.create_label_record(LabelDraft::undecided(ArticleId::new(3), 0, &annotator)),
            Err(StorageError::ArticleNotFound(_))
        ));
    }

    #[test]
    fn test_reopen_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quotelab.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.create_article(create_test_draft()).unwrap().id
        };

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.get_article(id).unwrap().is_some());
    }
}
