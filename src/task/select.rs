//! TaskSelector: decides which unit an annotator labels next
//!
//! Rules, in order, over articles in ascending id and sentences in
//! ascending index (first match wins on ties):
//!
//! 1. the first sentence nobody has labeled yet;
//! 2. for admins, the paragraph holding the lowest-confidence sentence, if
//!    that confidence is under the review threshold;
//! 3. the least-labeled sentence still under the target redundancy.
//!
//! Rules 1 and 3 skip sentences the requesting session already labeled;
//! rule 2 skips paragraphs it already labeled in full.
//! Selection never locks or reserves anything: two annotators may be handed
//! the same sentence, and the counters simply absorb both submissions.

use super::types::Task;
use crate::corpus::{AnnotationEngine, Annotator, ArticleId, CounterSnapshot, EngineResult};
use std::collections::HashSet;
use tracing::debug;

/// Selection policy over counter snapshots
#[derive(Debug, Clone, Copy)]
pub struct TaskSelector {
    pub review_threshold: u8,
    pub target_redundancy: u32,
}

impl TaskSelector {
    pub fn new(review_threshold: u8, target_redundancy: u32) -> Self {
        Self {
            review_threshold,
            target_redundancy,
        }
    }

    /// Pick the next task
    ///
    /// `snapshots` must be sorted by article id. `labeled` holds the
    /// (article, sentence) pairs the annotator's session already submitted.
    pub fn select(
        &self,
        snapshots: &[CounterSnapshot],
        annotator: &Annotator,
        labeled: &HashSet<(ArticleId, usize)>,
    ) -> Option<Task> {
        let visible: Vec<&CounterSnapshot> = snapshots
            .iter()
            .filter(|s| annotator.is_admin || !s.admin_only)
            .collect();

        if let Some(task) = self.first_unlabeled(&visible, labeled) {
            return Some(task);
        }
        if annotator.is_admin {
            if let Some(task) = self.lowest_confidence_paragraph(&visible, labeled) {
                return Some(task);
            }
        }
        self.least_labeled(&visible, labeled)
    }

    fn first_unlabeled(
        &self,
        visible: &[&CounterSnapshot],
        labeled: &HashSet<(ArticleId, usize)>,
    ) -> Option<Task> {
        visible
            .iter()
            .filter(|s| s.counters.min_label_count == 0)
            .find_map(|s| {
                s.counters
                    .label_counts
                    .iter()
                    .enumerate()
                    .find(|&(sentence, &count)| count == 0 && !labeled.contains(&(s.id, sentence)))
                    .map(|(sentence, _)| Task::sentence(s.id, sentence))
            })
    }

    fn lowest_confidence_paragraph(
        &self,
        visible: &[&CounterSnapshot],
        labeled: &HashSet<(ArticleId, usize)>,
    ) -> Option<Task> {
        let mut lowest: Option<(u8, &CounterSnapshot, usize, usize, usize)> = None;
        for snapshot in visible
            .iter()
            .filter(|s| s.counters.min_confidence < self.review_threshold)
        {
            let index = snapshot.index();
            for paragraph in 0..index.paragraph_count() {
                let Ok((first, last)) = index.sentence_range(paragraph) else {
                    continue;
                };
                // Already reviewed by this session.
                if (first..=last).all(|sentence| labeled.contains(&(snapshot.id, sentence))) {
                    continue;
                }
                for sentence in first..=last {
                    let Some(&confidence) = snapshot.counters.confidence.get(sentence) else {
                        continue;
                    };
                    // Strict comparison keeps the earliest sentence on ties.
                    if lowest.map_or(true, |(best, ..)| confidence < best) {
                        lowest = Some((confidence, snapshot, paragraph, first, last));
                    }
                }
            }
        }

        let (confidence, snapshot, paragraph, first, last) = lowest?;
        if confidence >= self.review_threshold {
            return None;
        }
        debug!(
            article = %snapshot.id,
            paragraph,
            confidence,
            "paragraph selected for review"
        );
        Some(Task::paragraph(snapshot.id, first, last))
    }

    fn least_labeled(
        &self,
        visible: &[&CounterSnapshot],
        labeled: &HashSet<(ArticleId, usize)>,
    ) -> Option<Task> {
        let mut best: Option<(u32, ArticleId, usize)> = None;
        for snapshot in visible
            .iter()
            .filter(|s| s.counters.min_label_count < self.target_redundancy)
        {
            for (sentence, &count) in snapshot.counters.label_counts.iter().enumerate() {
                if count >= self.target_redundancy || labeled.contains(&(snapshot.id, sentence)) {
                    continue;
                }
                if best.map_or(true, |(fewest, _, _)| count < fewest) {
                    best = Some((count, snapshot.id, sentence));
                }
            }
        }
        best.map(|(_, article, sentence)| Task::sentence(article, sentence))
    }
}

impl AnnotationEngine {
    /// Choose the next task for an annotator, or `None` when nothing is left
    ///
    /// Reads a snapshot of every article's counters without taking article
    /// locks; the answer may be stale by the time the annotator submits.
    pub fn next_task(&self, annotator: &Annotator) -> EngineResult<Option<Task>> {
        let snapshots = self.store().counter_snapshots()?;
        let labeled: HashSet<(ArticleId, usize)> = self
            .store()
            .session_labels(&annotator.session)?
            .into_iter()
            .collect();

        let config = self.config();
        let selector = TaskSelector::new(config.review_threshold, config.target_redundancy);
        let task = selector.select(&snapshots, annotator, &labeled);
        match &task {
            Some(task) => debug!(
                session = %annotator.session,
                article = %task.article_id,
                sentences = ?task.sentence_indices,
                granularity = ?task.granularity,
                "task selected"
            ),
            None => debug!(session = %annotator.session, "no task left"),
        }
        Ok(task)
    }
}
