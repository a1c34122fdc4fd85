//! Article: a tokenized text with sentence/paragraph boundaries and the
//! per-sentence counters the task engine mutates

use super::index::{IndexError, TextIndex};
use super::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest value a sentence confidence may take
pub const MAX_CONFIDENCE: u8 = 100;

/// Unique identifier for an article
///
/// Assigned by the store in ascending creation order; the task selector
/// relies on that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(u64);

impl ArticleId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ArticleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The mutable part of an article
///
/// The cached minima are only ever derived from the arrays through
/// [`ArticleCounters::recompute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCounters {
    /// Completed annotations per sentence
    pub label_counts: Vec<u32>,
    /// Cached `min(label_counts)`
    pub min_label_count: u32,
    /// Model confidence per sentence, 0..=100
    pub confidence: Vec<u8>,
    /// Cached `min(confidence)`
    pub min_confidence: u8,
}

impl ArticleCounters {
    /// Zeroed counters for an article with `sentences` sentences
    pub fn new(sentences: usize) -> Self {
        Self {
            label_counts: vec![0; sentences],
            min_label_count: 0,
            confidence: vec![0; sentences],
            min_confidence: 0,
        }
    }

    pub fn recompute(&mut self) {
        self.min_label_count = self.label_counts.iter().copied().min().unwrap_or(0);
        self.min_confidence = self.confidence.iter().copied().min().unwrap_or(0);
    }

    /// Count one more annotation for a sentence; returns the new count
    pub fn increment(&mut self, sentence: usize) -> Result<u32, IndexError> {
        let sentences = self.label_counts.len();
        let count = self
            .label_counts
            .get_mut(sentence)
            .ok_or(IndexError::SentenceOutOfRange {
                index: sentence,
                count: sentences,
            })?;
        *count += 1;
        let updated = *count;
        self.recompute();
        Ok(updated)
    }

    /// Replace the confidence array after checking every value
    ///
    /// Leaves `self` untouched on error.
    pub fn replace_confidence(&mut self, values: &[i32]) -> Result<u8, ValidationError> {
        if values.len() != self.confidence.len() {
            return Err(ValidationError::ConfidenceLength {
                expected: self.confidence.len(),
                found: values.len(),
            });
        }
        let mut checked = Vec::with_capacity(values.len());
        for (position, &value) in values.iter().enumerate() {
            if !(0..=i32::from(MAX_CONFIDENCE)).contains(&value) {
                return Err(ValidationError::ConfidenceValue { position, value });
            }
            checked.push(value as u8);
        }
        self.confidence = checked;
        self.recompute();
        Ok(self.min_confidence)
    }

    /// Zero the confidence of sentences `first..=last`
    pub fn reset_confidence(&mut self, first: usize, last: usize) -> Result<(), IndexError> {
        if first > last {
            return Err(IndexError::InvertedRange { first, last });
        }
        if last >= self.confidence.len() {
            return Err(IndexError::SentenceOutOfRange {
                index: last,
                count: self.confidence.len(),
            });
        }
        self.confidence[first..=last].fill(0);
        self.recompute();
        Ok(())
    }
}

/// Ingestion payload for a new article
///
/// Produced by the external tokenizer. `in_quotes` may be omitted, in which
/// case every token is flagged as outside quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub tokens: Vec<String>,
    pub sentence_ends: Vec<usize>,
    pub paragraph_ends: Vec<usize>,
    #[serde(default)]
    pub in_quotes: Vec<bool>,
    #[serde(default)]
    pub admin_only: bool,
}

impl ArticleDraft {
    /// Check every boundary invariant
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tokens.is_empty() {
            return Err(ValidationError::EmptyArticle);
        }
        check_boundaries("sentence_ends", &self.sentence_ends, self.tokens.len() - 1)?;
        check_boundaries(
            "paragraph_ends",
            &self.paragraph_ends,
            self.sentence_ends.len() - 1,
        )?;
        if !self.in_quotes.is_empty() && self.in_quotes.len() != self.tokens.len() {
            return Err(ValidationError::InQuotesLength {
                expected: self.tokens.len(),
                found: self.in_quotes.len(),
            });
        }
        Ok(())
    }

    /// Build the stored article; the caller has already run [`validate`](Self::validate)
    pub fn into_article(self, id: ArticleId, created_at: DateTime<Utc>) -> Article {
        let in_quotes = if self.in_quotes.is_empty() {
            vec![false; self.tokens.len()]
        } else {
            self.in_quotes
        };
        Article {
            id,
            title: self.title,
            counters: ArticleCounters::new(self.sentence_ends.len()),
            tokens: self.tokens,
            sentence_ends: self.sentence_ends,
            paragraph_ends: self.paragraph_ends,
            in_quotes,
            admin_only: self.admin_only,
            created_at,
        }
    }
}

fn check_boundaries(
    array: &'static str,
    ends: &[usize],
    expected_last: usize,
) -> Result<(), ValidationError> {
    let Some(&last) = ends.last() else {
        return Err(ValidationError::BoundaryTerminal {
            array,
            expected: expected_last,
            found: 0,
        });
    };
    if let Some(position) = ends.windows(2).position(|w| w[0] >= w[1]) {
        return Err(ValidationError::BoundaryNotIncreasing {
            array,
            position: position + 1,
        });
    }
    if last != expected_last {
        return Err(ValidationError::BoundaryTerminal {
            array,
            expected: expected_last,
            found: last,
        });
    }
    Ok(())
}

/// A stored article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub tokens: Vec<String>,
    /// Last token index of each sentence
    pub sentence_ends: Vec<usize>,
    /// Last sentence index of each paragraph
    pub paragraph_ends: Vec<usize>,
    pub in_quotes: Vec<bool>,
    /// Only admins are offered tasks from this article
    pub admin_only: bool,
    pub counters: ArticleCounters,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn index(&self) -> TextIndex<'_> {
        TextIndex::new(&self.sentence_ends, &self.paragraph_ends)
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_ends.len()
    }

    /// Tokens of sentences `first..=last`, in order
    pub fn tokens_between(&self, first: usize, last: usize) -> Result<&[String], IndexError> {
        let (first_token, last_token) = self.index().token_range(first, last)?;
        Ok(&self.tokens[first_token..=last_token])
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            id: self.id,
            admin_only: self.admin_only,
            sentence_ends: self.sentence_ends.clone(),
            paragraph_ends: self.paragraph_ends.clone(),
            counters: self.counters.clone(),
        }
    }
}

/// What task selection needs to know about an article (no tokens)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub id: ArticleId,
    pub admin_only: bool,
    pub sentence_ends: Vec<usize>,
    pub paragraph_ends: Vec<usize>,
    pub counters: ArticleCounters,
}

impl CounterSnapshot {
    pub fn index(&self) -> TextIndex<'_> {
        TextIndex::new(&self.sentence_ends, &self.paragraph_ends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ArticleDraft {
        ArticleDraft {
            title: "three sentences".to_string(),
            tokens: (0..9).map(|i| format!("t{i}")).collect(),
            sentence_ends: vec![2, 5, 8],
            paragraph_ends: vec![1, 2],
            in_quotes: Vec::new(),
            admin_only: false,
        }
    }

    #[test]
    fn test_valid_draft() {
        let draft = draft();
        assert!(draft.validate().is_ok());

        let article = draft.into_article(ArticleId::new(1), Utc::now());
        assert_eq!(article.in_quotes.len(), 9);
        assert_eq!(article.counters.label_counts, vec![0, 0, 0]);
        assert_eq!(article.counters.confidence, vec![0, 0, 0]);
        assert_eq!(article.tokens_between(1, 1).unwrap(), &["t3", "t4", "t5"]);
    }

    #[test]
    fn test_draft_rejects_bad_boundaries() {
        let mut d = draft();
        d.sentence_ends = vec![2, 2, 8];
        assert_eq!(
            d.validate(),
            Err(ValidationError::BoundaryNotIncreasing {
                array: "sentence_ends",
                position: 1
            })
        );

        let mut d = draft();
        d.sentence_ends = vec![2, 5, 7];
        assert!(matches!(
            d.validate(),
            Err(ValidationError::BoundaryTerminal { expected: 8, found: 7, .. })
        ));

        let mut d = draft();
        d.paragraph_ends = vec![1];
        assert!(matches!(
            d.validate(),
            Err(ValidationError::BoundaryTerminal { array: "paragraph_ends", .. })
        ));

        let mut d = draft();
        d.in_quotes = vec![false; 3];
        assert!(matches!(d.validate(), Err(ValidationError::InQuotesLength { .. })));

        let mut d = draft();
        d.tokens.clear();
        assert_eq!(d.validate(), Err(ValidationError::EmptyArticle));
    }

    #[test]
    fn test_increment_updates_minimum() {
        let mut counters = ArticleCounters::new(3);
        assert_eq!(counters.increment(0).unwrap(), 1);
        assert_eq!(counters.min_label_count, 0);
        counters.increment(1).unwrap();
        counters.increment(2).unwrap();
        assert_eq!(counters.min_label_count, 1);
        assert_eq!(
            counters.increment(3),
            Err(IndexError::SentenceOutOfRange { index: 3, count: 3 })
        );
        assert_eq!(counters.label_counts, vec![1, 1, 1]);
    }

    #[test]
    fn test_replace_confidence_fails_closed() {
        let mut counters = ArticleCounters::new(3);
        assert_eq!(counters.replace_confidence(&[40, 90, 70]).unwrap(), 40);

        let before = counters.clone();
        assert!(matches!(
            counters.replace_confidence(&[10, 150, 20]),
            Err(ValidationError::ConfidenceValue { position: 1, value: 150 })
        ));
        assert!(matches!(
            counters.replace_confidence(&[-1, 50, 20]),
            Err(ValidationError::ConfidenceValue { position: 0, value: -1 })
        ));
        assert!(matches!(
            counters.replace_confidence(&[10, 20]),
            Err(ValidationError::ConfidenceLength { expected: 3, found: 2 })
        ));
        assert_eq!(counters, before);
    }

    #[test]
    fn test_reset_confidence() {
        let mut counters = ArticleCounters::new(4);
        counters.replace_confidence(&[80, 90, 95, 85]).unwrap();
        counters.reset_confidence(1, 2).unwrap();
        assert_eq!(counters.confidence, vec![80, 0, 0, 85]);
        assert_eq!(counters.min_confidence, 0);
        assert!(counters.reset_confidence(3, 4).is_err());
    }
}
