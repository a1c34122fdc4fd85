//! In-process store backed by concurrent maps

use super::traits::{ArticleStore, StorageError, StorageResult};
use crate::corpus::{
    Article, ArticleCounters, ArticleDraft, ArticleId, CounterSnapshot, LabelDraft, LabelRecord,
    SessionId,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Store that keeps everything in memory
///
/// Used by tests and by embedders that persist elsewhere.
#[derive(Debug)]
pub struct MemoryStore {
    articles: DashMap<ArticleId, Article>,
    /// Label records grouped by article, in creation order
    labels: DashMap<ArticleId, Vec<LabelRecord>>,
    next_article: AtomicU64,
    next_label: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            articles: DashMap::new(),
            labels: DashMap::new(),
            next_article: AtomicU64::new(1),
            next_label: AtomicI64::new(1),
        }
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }
}

impl ArticleStore for MemoryStore {
    fn create_article(&self, draft: ArticleDraft) -> StorageResult<Article> {
        draft.validate()?;
        let id = ArticleId::new(self.next_article.fetch_add(1, Ordering::SeqCst));
        let article = draft.into_article(id, Utc::now());
        self.articles.insert(id, article.clone());
        Ok(article)
    }

    fn get_article(&self, id: ArticleId) -> StorageResult<Option<Article>> {
        Ok(self.articles.get(&id).map(|r| r.clone()))
    }

    fn list_article_ids(&self) -> StorageResult<Vec<ArticleId>> {
        let mut ids: Vec<ArticleId> = self.articles.iter().map(|r| *r.key()).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn counter_snapshots(&self) -> StorageResult<Vec<CounterSnapshot>> {
        let mut snapshots: Vec<CounterSnapshot> =
            self.articles.iter().map(|r| r.value().snapshot()).collect();
        snapshots.sort_unstable_by_key(|s| s.id);
        Ok(snapshots)
    }

    fn save_article_counters(&self, id: ArticleId, counters: &ArticleCounters) -> StorageResult<()> {
        let mut article = self
            .articles
            .get_mut(&id)
            .ok_or(StorageError::ArticleNotFound(id))?;
        if counters.label_counts.len() != article.sentence_count()
            || counters.confidence.len() != article.sentence_count()
        {
            return Err(StorageError::Corrupt(format!(
                "counter arrays for article {} do not match its {} sentences",
                id,
                article.sentence_count()
            )));
        }
        article.counters = counters.clone();
        Ok(())
    }

    fn create_label_record(&self, draft: LabelDraft) -> StorageResult<LabelRecord> {
        if !self.articles.contains_key(&draft.article_id) {
            return Err(StorageError::ArticleNotFound(draft.article_id));
        }
        let id = self.next_label.fetch_add(1, Ordering::SeqCst);
        let record = draft.into_record(id, Utc::now());
        self.labels
            .entry(record.article_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn list_label_records(&self, article: ArticleId, sentence: usize) -> StorageResult<Vec<LabelRecord>> {
        Ok(self
            .labels
            .get(&article)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.sentence_index == sentence)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn session_labels(&self, session: &SessionId) -> StorageResult<Vec<(ArticleId, usize)>> {
        let mut pairs: Vec<(ArticleId, usize)> = self
            .labels
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|r| &r.session == session)
                    .map(|r| (r.article_id, r.sentence_index))
                    .collect::<Vec<_>>()
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        Ok(pairs)
    }
}
