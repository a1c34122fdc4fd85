//! AnnotationEngine: shared state behind every task-engine operation
//!
//! The engine owns the injected store, the configuration, and one mutex per
//! article. Counter mutation for an article happens only while that
//! article's mutex is held; reads (task selection, consensus, context
//! windows) never take it.

use super::article::{Article, ArticleDraft, ArticleId};
use super::index::IndexError;
use super::validation::ValidationError;
use crate::config::EngineConfig;
use crate::storage::{ArticleStore, StorageError};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur in engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Article not found: {0}")]
    ArticleNotFound(ArticleId),

    #[error("No context above sentence {sentence} of article {article}")]
    NoContextAbove { article: ArticleId, sentence: usize },

    #[error("No context below sentence {sentence} of article {article}")]
    NoContextBelow { article: ArticleId, sentence: usize },

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of an [`EngineError`] for transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown article, or no context in the requested direction
    NotFound,
    /// The request was malformed; nothing was mutated
    Validation,
    /// The store failed
    Storage,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ArticleNotFound(_)
            | EngineError::NoContextAbove { .. }
            | EngineError::NoContextBelow { .. }
            | EngineError::Storage(StorageError::ArticleNotFound(_)) => ErrorKind::NotFound,
            EngineError::Index(_)
            | EngineError::Validation(_)
            | EngineError::Storage(StorageError::InvalidArticle(_)) => ErrorKind::Validation,
            EngineError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// The annotation task engine
pub struct AnnotationEngine {
    store: Arc<dyn ArticleStore>,
    config: EngineConfig,
    /// One exclusive section per article, created on first write
    locks: DashMap<ArticleId, Arc<Mutex<()>>>,
}

impl AnnotationEngine {
    /// Create an engine with the default configuration
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn ArticleStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn ArticleStore {
        self.store.as_ref()
    }

    /// Hand a tokenized article over from ingestion
    pub fn import_article(&self, draft: ArticleDraft) -> EngineResult<Article> {
        let article = self.store.create_article(draft)?;
        info!(
            article = %article.id,
            sentences = article.sentence_count(),
            paragraphs = article.paragraph_ends.len(),
            admin_only = article.admin_only,
            "article imported"
        );
        Ok(article)
    }

    /// Load an article, mapping absence to `ArticleNotFound`
    pub fn article(&self, id: ArticleId) -> EngineResult<Article> {
        self.store
            .get_article(id)?
            .ok_or(EngineError::ArticleNotFound(id))
    }

    /// Run `f` inside the exclusive section of one article
    ///
    /// Different articles never contend. `f` must re-read the article: the
    /// counters may have moved while waiting for the lock. Unknown ids fail
    /// with `ArticleNotFound` and never get a registry entry.
    pub(crate) fn with_article_lock<T>(
        &self,
        id: ArticleId,
        f: impl FnOnce() -> EngineResult<T>,
    ) -> EngineResult<T> {
        if !self.locks.contains_key(&id) && self.store.get_article(id)?.is_none() {
            return Err(EngineError::ArticleNotFound(id));
        }
        // Clone the Arc out so the map shard is released before blocking.
        let lock = self.locks.entry(id).or_default().clone();
        // The guarded value is (); a panic in another writer leaves nothing
        // half-written in memory, so a poisoned lock is safe to reuse.
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        debug!(article = %id, "article lock acquired");
        f()
    }
}
