//! Task and window types

use crate::corpus::ArticleId;
use serde::{Deserialize, Serialize};

/// How much text a task covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Label one sentence token by token
    Sentence,
    /// Review a whole paragraph
    Paragraph,
}

/// A unit of work offered to an annotator; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub article_id: ArticleId,
    /// Contiguous, ascending sentence indices
    pub sentence_indices: Vec<usize>,
    pub granularity: Granularity,
}

impl Task {
    pub fn sentence(article_id: ArticleId, sentence: usize) -> Self {
        Self {
            article_id,
            sentence_indices: vec![sentence],
            granularity: Granularity::Sentence,
        }
    }

    /// A paragraph task covering sentences `first..=last`
    pub fn paragraph(article_id: ArticleId, first: usize, last: usize) -> Self {
        Self {
            article_id,
            sentence_indices: (first..=last).collect(),
            granularity: Granularity::Paragraph,
        }
    }

    pub fn first_sentence(&self) -> Option<usize> {
        self.sentence_indices.first().copied()
    }

    pub fn last_sentence(&self) -> Option<usize> {
        self.sentence_indices.last().copied()
    }
}

/// A task together with the text the annotator needs to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub task: Task,
    pub tokens: Vec<String>,
    /// Article index of `tokens[0]`
    pub first_token: usize,
}

/// Extra context loaded around a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub article_id: ArticleId,
    pub tokens: Vec<String>,
    pub first_sentence: usize,
    pub last_sentence: usize,
    /// Article index of `tokens[0]`
    pub first_token: usize,
}
