//! LabelIngestor: validate submissions and record them against the counters
//!
//! Every payload is checked in full before the article lock is taken, so a
//! rejected request never touches state. Inside the lock the article is
//! re-read, the counters are advanced and saved, and only then are the label
//! records written. A failing write rolls the counters back to what was
//! actually recorded.

use crate::corpus::{
    relative_to_global, AnnotationEngine, Annotator, Article, ArticleCounters, ArticleId,
    EngineResult, LabelDraft, LabelRecord, ValidationError, PLAIN, REPORTED,
};
use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Records written by a windowed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// One record per target sentence, in sentence order
    pub records: Vec<LabelRecord>,
    /// At least one record marks reported speech
    pub found_quote: bool,
}

impl SubmissionOutcome {
    fn new(records: Vec<LabelRecord>) -> Self {
        let found_quote = records.iter().any(LabelRecord::has_reported_speech);
        Self {
            records,
            found_quote,
        }
    }
}

/// What a paragraph review did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// The reviewer found no reported speech (or could not decide)
    Recorded(SubmissionOutcome),
    /// The reviewer found reported speech; the paragraph goes back to the queue
    ConfidenceReset {
        first_sentence: usize,
        last_sentence: usize,
        min_confidence: u8,
    },
}

fn check_labels(labels: &[u8], sentence: usize, expected: usize) -> Result<(), ValidationError> {
    if labels.len() != expected {
        return Err(ValidationError::LabelLength {
            sentence,
            expected,
            found: labels.len(),
        });
    }
    match labels
        .iter()
        .position(|&label| label != PLAIN && label != REPORTED)
    {
        Some(position) => Err(ValidationError::LabelValue {
            position,
            value: labels[position],
        }),
        None => Ok(()),
    }
}

fn check_authors(authors: &[usize], first: usize, last: usize) -> Result<(), ValidationError> {
    match authors.iter().find(|&&a| a < first || a > last) {
        Some(&author) => Err(ValidationError::AuthorOutOfRange {
            author,
            first,
            last,
        }),
        None => Ok(()),
    }
}

/// Split window labels into one draft per target sentence
///
/// `labels` covers sentences `first..=last` of the article; `authors` are
/// already global.
fn split_window(
    article: &Article,
    targets: &[usize],
    window: (usize, usize),
    labels: &[u8],
    authors: &[usize],
    annotator: &Annotator,
) -> EngineResult<Vec<LabelDraft>> {
    let index = article.index();
    let (window_first_token, _) = index.token_range(window.0, window.1)?;
    targets
        .iter()
        .map(|&sentence| {
            let (first, last) = index.token_range(sentence, sentence)?;
            let from = first - window_first_token;
            let to = last - window_first_token;
            Ok(LabelDraft {
                article_id: article.id,
                session: annotator.session,
                sentence_index: sentence,
                labels: labels[from..=to].to_vec(),
                authors: authors.to_vec(),
                admin: annotator.is_admin,
            })
        })
        .collect()
}

impl AnnotationEngine {
    /// Record one annotator's labels for a single sentence
    ///
    /// Empty `labels` means the annotator could not decide; the record is
    /// stored without labels or authors and still counts toward redundancy.
    /// `authors` are article token indices and must fall inside the sentence.
    pub fn submit(
        &self,
        article_id: ArticleId,
        sentence: usize,
        labels: Vec<u8>,
        authors: Vec<usize>,
        annotator: &Annotator,
    ) -> EngineResult<LabelRecord> {
        let article = self.article(article_id)?;
        let (first, last) = article.index().token_range(sentence, sentence)?;

        let draft = if labels.is_empty() {
            LabelDraft::undecided(article_id, sentence, annotator)
        } else {
            check_labels(&labels, sentence, last - first + 1)?;
            check_authors(&authors, first, last)?;
            LabelDraft {
                article_id,
                session: annotator.session,
                sentence_index: sentence,
                labels,
                authors,
                admin: annotator.is_admin,
            }
        };

        let mut records = self.record_labels(article_id, vec![draft])?;
        records
            .pop()
            .ok_or_else(|| StorageError::Corrupt("no label record written".to_string()).into())
    }

    /// Record labels made in a context window
    ///
    /// The annotator saw sentences `first_sentence..=last_sentence`; `labels`
    /// covers every token of that window and `relative_authors` are indices
    /// into it. Each target sentence gets its own record carrying all the
    /// translated authors.
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
        let article = self.article(article_id)?;
        let (first_token, last_token) = article.index().token_range(first_sentence, last_sentence)?;

        let (Some(&first_target), Some(&last_target)) = (targets.first(), targets.last()) else {
            return Err(ValidationError::EmptyTargets.into());
        };
        let contiguous = targets.windows(2).all(|w| w[1] == w[0] + 1);
        if !contiguous || first_target < first_sentence || last_target > last_sentence {
            return Err(ValidationError::TargetsOutsideWindow {
                first: first_sentence,
                last: last_sentence,
            }
            .into());
        }

        let drafts = if labels.is_empty() {
            targets
                .iter()
                .map(|&sentence| LabelDraft::undecided(article_id, sentence, annotator))
                .collect()
        } else {
            check_labels(&labels, first_sentence, last_token - first_token + 1)?;
            let authors: Vec<usize> = relative_authors
                .iter()
                .map(|&local| relative_to_global(local, first_token))
                .collect();
            check_authors(&authors, first_token, last_token)?;
            split_window(
                &article,
                targets,
                (first_sentence, last_sentence),
                &labels,
                &authors,
                annotator,
            )?
        };

        let outcome = SubmissionOutcome::new(self.record_labels(article_id, drafts)?);
        debug!(
            article = %article_id,
            targets = ?targets,
            found_quote = outcome.found_quote,
            "window submission recorded"
        );
        Ok(outcome)
    }

    /// Record the verdict of a paragraph review
    ///
    /// The reviewer saw sentences `first_sentence..=last_sentence`, which
    /// must contain the paragraph; `labels` covers that whole window. Any
    /// reported-speech label resets the confidence of every sentence in the
    /// window to 0 and writes no records. Otherwise the paragraph's labels
    /// are sliced out of the window as in [`submit_window`](Self::submit_window).
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
        let article = self.article(article_id)?;
        let index = article.index();
        let (first, last) = index.sentence_range(paragraph)?;
        let (first_token, last_token) = index.token_range(first_sentence, last_sentence)?;
        if first < first_sentence || last > last_sentence {
            return Err(ValidationError::TargetsOutsideWindow {
                first: first_sentence,
                last: last_sentence,
            }
            .into());
        }

        if !labels.contains(&REPORTED) {
            let targets: Vec<usize> = (first..=last).collect();
            let outcome = self.submit_window(
                article_id,
                &targets,
                first_sentence,
                last_sentence,
                labels,
                relative_authors,
                annotator,
            )?;
            return Ok(ReviewOutcome::Recorded(outcome));
        }

        check_labels(&labels, first_sentence, last_token - first_token + 1)?;
        let min_confidence = self.with_article_lock(article_id, || {
            let mut counters = self.article(article_id)?.counters;
            counters.reset_confidence(first_sentence, last_sentence)?;
            self.store().save_article_counters(article_id, &counters)?;
            Ok(counters.min_confidence)
        })?;
        info!(
            article = %article_id,
            paragraph,
            first_sentence,
            last_sentence,
            "review found reported speech, confidence reset"
        );
        Ok(ReviewOutcome::ConfidenceReset {
            first_sentence,
            last_sentence,
            min_confidence,
        })
    }

    /// Replace an article's confidence array; returns the new minimum
    ///
    /// Fails closed: a wrong length or a value outside 0..=100 leaves the
    /// stored array untouched.
    pub fn update_confidence(&self, article_id: ArticleId, confidences: &[i32]) -> EngineResult<u8> {
        self.with_article_lock(article_id, || {
            let mut counters = self.article(article_id)?.counters;
            let min_confidence = match counters.replace_confidence(confidences) {
                Ok(min) => min,
                Err(e) => {
                    warn!(article = %article_id, error = %e, "confidence update rejected");
                    return Err(e.into());
                }
            };
            self.store().save_article_counters(article_id, &counters)?;
            debug!(article = %article_id, min_confidence, "confidence updated");
            Ok(min_confidence)
        })
    }

    /// Advance the counters and persist validated drafts of one article
    fn record_labels(&self, article_id: ArticleId, drafts: Vec<LabelDraft>) -> EngineResult<Vec<LabelRecord>> {
        self.with_article_lock(article_id, || {
            let previous = self.article(article_id)?.counters;
            let mut counters = previous.clone();
            for draft in &drafts {
                counters.increment(draft.sentence_index)?;
            }
            self.store().save_article_counters(article_id, &counters)?;

            let sentences: Vec<usize> = drafts.iter().map(|d| d.sentence_index).collect();
            let mut records = Vec::with_capacity(drafts.len());
            for draft in drafts {
                match self.store().create_label_record(draft) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        self.restore_counters(article_id, previous, &sentences[..records.len()]);
                        return Err(e.into());
                    }
                }
            }

            info!(
                article = %article_id,
                sentences = ?sentences,
                min_label_count = counters.min_label_count,
                "labels recorded"
            );
            Ok(records)
        })
    }

    /// Put back the counters as of `previous` plus the records that made it
    fn restore_counters(&self, article_id: ArticleId, mut previous: ArticleCounters, written: &[usize]) {
        for &sentence in written {
            // Already incremented once above, so the index is valid.
            let _ = previous.increment(sentence);
        }
        if let Err(e) = self.store().save_article_counters(article_id, &previous) {
            warn!(article = %article_id, error = %e, "failed to restore counters");
        }
    }
}
