//! Storage trait definitions

use crate::corpus::{
    Article, ArticleCounters, ArticleDraft, ArticleId, CounterSnapshot, LabelDraft, LabelRecord,
    SessionId, ValidationError,
};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Article not found: {0}")]
    ArticleNotFound(ArticleId),

    #[error("Invalid article: {0}")]
    InvalidArticle(#[from] ValidationError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Record store for articles and label records
///
/// Implementations must be thread-safe (Send + Sync). Each call is atomic
/// on its own; multi-call sequences are serialized by the engine's
/// per-article lock, not by the store.
pub trait ArticleStore: Send + Sync {
    // === Article Operations ===

    /// Validate and insert a new article with zeroed counters
    ///
    /// Ids are assigned in ascending order.
    fn create_article(&self, draft: ArticleDraft) -> StorageResult<Article>;

    /// Load an article by id
    fn get_article(&self, id: ArticleId) -> StorageResult<Option<Article>>;

    /// All article ids, ascending
    fn list_article_ids(&self) -> StorageResult<Vec<ArticleId>>;

    /// Counter views of every article, ascending by id
    fn counter_snapshots(&self) -> StorageResult<Vec<CounterSnapshot>>;

    /// Overwrite the counter arrays and cached minima of an article
    fn save_article_counters(&self, id: ArticleId, counters: &ArticleCounters) -> StorageResult<()>;

    // === Label Operations ===

    /// Persist a new label record
    fn create_label_record(&self, draft: LabelDraft) -> StorageResult<LabelRecord>;

    /// Records for one sentence, in creation order
    fn list_label_records(&self, article: ArticleId, sentence: usize) -> StorageResult<Vec<LabelRecord>>;

    /// Every (article, sentence) pair a session has labeled
    fn session_labels(&self, session: &SessionId) -> StorageResult<Vec<(ArticleId, usize)>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: ArticleStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
