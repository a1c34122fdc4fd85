//! ConsensusEngine: merge independent annotations of one sentence
//!
//! A token is reported speech only when a strict majority of the decided
//! records say so; an exact split stays plain. Records that could not
//! decide take part in neither the vote nor the agreement score.

use crate::corpus::{
    global_to_relative, AnnotationEngine, ArticleId, EngineResult, LabelRecord, PLAIN, REPORTED,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Which author indices survive consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorPolicy {
    /// Keep an author only if it sits on a consensus reported-speech token
    #[default]
    OnSpan,
    /// Keep every author as soon as the sentence holds any reported speech
    AnySpan,
}

/// Merged labels of one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub labels: Vec<u8>,
    /// Sorted, global token indices
    pub authors: Vec<usize>,
    /// Fraction of decided records that match `labels` exactly
    pub agreement: f64,
    /// Decided records that took part in the vote
    pub contributors: usize,
    /// Records that could not decide
    pub undecided: usize,
}

impl Consensus {
    fn unanimous_unknown(undecided: usize) -> Self {
        Self {
            labels: Vec::new(),
            authors: Vec::new(),
            agreement: 1.0,
            contributors: 0,
            undecided,
        }
    }

    pub fn has_reported_speech(&self) -> bool {
        self.labels.contains(&REPORTED)
    }
}

/// Consensus for a sentence, as returned to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub article_id: ArticleId,
    pub sentence_index: usize,
    #[serde(flatten)]
    pub consensus: Consensus,
}

/// Majority vote over label records
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusEngine {
    policy: AuthorPolicy,
}

impl ConsensusEngine {
    pub fn new(policy: AuthorPolicy) -> Self {
        Self { policy }
    }

    /// Merge the records of one sentence of `width` tokens starting at
    /// `first_token`
    ///
    /// Decided records of any other length are left out of the vote.
    pub fn consensus(&self, records: &[LabelRecord], first_token: usize, width: usize) -> Consensus {
        let undecided = records.iter().filter(|r| r.is_undecided()).count();
        let voters: Vec<&LabelRecord> = records
            .iter()
            .filter(|r| !r.is_undecided())
            .filter(|record| {
                let matches = record.labels.len() == width;
                if !matches {
                    warn!(
                        record = record.id,
                        article = %record.article_id,
                        sentence = record.sentence_index,
                        expected = width,
                        found = record.labels.len(),
                        "label record excluded from consensus"
                    );
                }
                matches
            })
            .collect();
        if voters.is_empty() {
            return Consensus::unanimous_unknown(undecided);
        }

        let labels: Vec<u8> = (0..width)
            .map(|position| {
                let votes = voters
                    .iter()
                    .filter(|r| r.labels[position] == REPORTED)
                    .count();
                if votes * 2 > voters.len() {
                    REPORTED
                } else {
                    PLAIN
                }
            })
            .collect();

        let agreeing = voters.iter().filter(|r| r.labels == labels).count();
        let agreement = agreeing as f64 / voters.len() as f64;

        let authors = self.merge_authors(&voters, &labels, first_token);

        Consensus {
            labels,
            authors,
            agreement,
            contributors: voters.len(),
            undecided,
        }
    }

    fn merge_authors(&self, voters: &[&LabelRecord], labels: &[u8], first_token: usize) -> Vec<usize> {
        let union: BTreeSet<usize> = voters
            .iter()
            .flat_map(|r| r.authors.iter().copied())
            .collect();

        match self.policy {
            AuthorPolicy::OnSpan => union
                .into_iter()
                .filter(|&author| {
                    global_to_relative(author, first_token)
                        .and_then(|local| labels.get(local))
                        .is_some_and(|&label| label == REPORTED)
                })
                .collect(),
            AuthorPolicy::AnySpan if labels.contains(&REPORTED) => union.into_iter().collect(),
            AuthorPolicy::AnySpan => Vec::new(),
        }
    }
}

impl AnnotationEngine {
    /// Recompute the consensus of one sentence from its stored records
    pub fn consensus(&self, article_id: ArticleId, sentence: usize) -> EngineResult<ConsensusResult> {
        let article = self.article(article_id)?;
        let (first_token, last_token) = article.index().token_range(sentence, sentence)?;
        let records = self.store().list_label_records(article_id, sentence)?;

        let consensus = ConsensusEngine::new(self.config().author_policy).consensus(
            &records,
            first_token,
            last_token - first_token + 1,
        );
        debug!(
            article = %article_id,
            sentence,
            contributors = consensus.contributors,
            undecided = consensus.undecided,
            agreement = consensus.agreement,
            "consensus computed"
        );
        Ok(ConsensusResult {
            article_id,
            sentence_index: sentence,
            consensus,
        })
    }
}
