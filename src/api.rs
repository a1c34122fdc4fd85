//! Transport-independent API layer.
//!
//! `AnnotationApi` is the single entry point for annotator-facing operations.
//! Transports (HTTP handlers, the CLI, direct embedding) call `AnnotationApi`
//! methods; they never reach into the store or the selector directly.

use std::sync::Arc;

use crate::corpus::{
    AnnotationEngine, Annotator, Article, ArticleDraft, ArticleId, EngineResult, LabelRecord,
    ValidationError,
};
use crate::labeling::{ConsensusResult, ReviewOutcome, SubmissionOutcome};
use crate::task::{AssignedTask, Granularity, Window};
use serde::Serialize;

/// Single entry point for all annotator-facing operations.
#[derive(Clone)]
pub struct AnnotationApi {
    engine: Arc<AnnotationEngine>,
}

impl AnnotationApi {
    pub fn new(engine: Arc<AnnotationEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &AnnotationEngine {
        &self.engine
    }

    // --- Ingestion ---

    /// Accept a tokenized article; returns its id.
    pub fn import_article(&self, draft: ArticleDraft) -> EngineResult<ArticleId> {
        Ok(self.engine.import_article(draft)?.id)
    }

    /// Overview of every stored article, ascending by id.
    pub fn list_articles(&self) -> EngineResult<Vec<ArticleInfo>> {
        self.engine
            .store()
            .list_article_ids()?
            .into_iter()
            .map(|id| self.engine.article(id).map(|article| ArticleInfo::from(&article)))
            .collect()
    }

    // --- Read ---

    /// The next task for this annotator together with the text to show.
    ///
    /// `None` means the campaign is exhausted for this annotator.
    pub fn next_task(&self, annotator: &Annotator) -> EngineResult<Option<AssignedTask>> {
        let Some(task) = self.engine.next_task(annotator)? else {
            return Ok(None);
        };
        let (Some(first), Some(last)) = (task.first_sentence(), task.last_sentence()) else {
            return Ok(None);
        };
        let article = self.engine.article(task.article_id)?;
        let (first_token, _) = article.index().token_range(first, last)?;
        let tokens = article.tokens_between(first, last)?.to_vec();
        Ok(Some(AssignedTask {
            task,
            tokens,
            first_token,
        }))
    }

    /// Context above `first_sentence`; NotFound at the top of the article.
    pub fn context_above(&self, article_id: ArticleId, first_sentence: usize) -> EngineResult<Window> {
        self.engine.context_above(article_id, first_sentence)
    }

    /// Context below `last_sentence`; NotFound at the bottom of the article.
    pub fn context_below(&self, article_id: ArticleId, last_sentence: usize) -> EngineResult<Window> {
        self.engine.context_below(article_id, last_sentence)
    }

    pub fn consensus(&self, article_id: ArticleId, sentence: usize) -> EngineResult<ConsensusResult> {
        self.engine.consensus(article_id, sentence)
    }

    // --- Write ---

    /// Labels for one sentence, authors in article coordinates.
    pub fn submit_labels(
        &self,
        article_id: ArticleId,
        sentence: usize,
        labels: Vec<u8>,
        authors: Vec<usize>,
        annotator: &Annotator,
    ) -> EngineResult<LabelRecord> {
        self.engine
            .submit(article_id, sentence, labels, authors, annotator)
    }

    /// Labels made over a context window, authors relative to the window.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_window(
        &self,
        article_id: ArticleId,
        targets: &[usize],
        first_sentence: usize,
        last_sentence: usize,
        labels: Vec<u8>,
        relative_authors: Vec<usize>,
        annotator: &Annotator,
    ) -> EngineResult<SubmissionOutcome> {
        self.engine.submit_window(
            article_id,
            targets,
            first_sentence,
            last_sentence,
            labels,
            relative_authors,
            annotator,
        )
    }

    /// The answer to an assigned task, routed by its granularity.
    ///
    /// `first_sentence..=last_sentence` is what the annotator ended up
    /// seeing, context loads included.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_task(
        &self,
        assigned: &AssignedTask,
        first_sentence: usize,
        last_sentence: usize,
        labels: Vec<u8>,
        relative_authors: Vec<usize>,
        annotator: &Annotator,
    ) -> EngineResult<TaskOutcome> {
        let task = &assigned.task;
        match task.granularity {
            Granularity::Sentence => self
                .submit_window(
                    task.article_id,
                    &task.sentence_indices,
                    first_sentence,
                    last_sentence,
                    labels,
                    relative_authors,
                    annotator,
                )
                .map(TaskOutcome::Labels),
            Granularity::Paragraph => {
                let first = task
                    .first_sentence()
                    .ok_or(ValidationError::EmptyTargets)?;
                let article = self.engine.article(task.article_id)?;
                let paragraph = article.index().paragraph_of(first)?;
                self.submit_review(
                    task.article_id,
                    paragraph,
                    first_sentence,
                    last_sentence,
                    labels,
                    relative_authors,
                    annotator,
                )
                .map(TaskOutcome::Review)
            }
        }
    }

    /// A paragraph review over the window the reviewer saw.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_review(
        &self,
        article_id: ArticleId,
        paragraph: usize,
        first_sentence: usize,
        last_sentence: usize,
        labels: Vec<u8>,
        relative_authors: Vec<usize>,
        annotator: &Annotator,
    ) -> EngineResult<ReviewOutcome> {
        self.engine.submit_review(
            article_id,
            paragraph,
            first_sentence,
            last_sentence,
            labels,
            relative_authors,
            annotator,
        )
    }

    /// New model confidences for an article; returns the new minimum.
    pub fn update_confidence(&self, article_id: ArticleId, confidences: &[i32]) -> EngineResult<u8> {
        self.engine.update_confidence(article_id, confidences)
    }
}

impl std::fmt::Debug for AnnotationApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationApi")
            .field("config", self.engine.config())
            .finish_non_exhaustive()
    }
}

/// Result of [`AnnotationApi::submit_task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaskOutcome {
    Labels(SubmissionOutcome),
    Review(ReviewOutcome),
}

/// Info about an article (for listings).
#[derive(Debug, Clone, Serialize)]
pub struct ArticleInfo {
    pub id: ArticleId,
    pub title: String,
    pub sentences: usize,
    pub paragraphs: usize,
    pub min_label_count: u32,
    pub min_confidence: u8,
    pub admin_only: bool,
}

impl From<&Article> for ArticleInfo {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            sentences: article.sentence_count(),
            paragraphs: article.paragraph_ends.len(),
            min_label_count: article.counters.min_label_count,
            min_confidence: article.counters.min_confidence,
            admin_only: article.admin_only,
        }
    }
}

impl std::fmt::Display for ArticleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{} sentences\tmin labels {}\tmin confidence {}{}",
            self.id,
            self.title,
            self.sentences,
            self.min_label_count,
            self.min_confidence,
            if self.admin_only { "\tadmin only" } else { "" }
        )
    }
}
