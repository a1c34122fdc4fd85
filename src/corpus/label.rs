//! Label records: one annotator's submission for one sentence

use super::article::ArticleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token is not part of reported speech
pub const PLAIN: u8 = 0;
/// Token is part of reported speech
pub const REPORTED: u8 = 1;

/// Identifier of an annotator session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Who is asking for work or submitting it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotator {
    pub session: SessionId,
    pub is_admin: bool,
}

impl Annotator {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            is_admin: false,
        }
    }

    pub fn admin(session: SessionId) -> Self {
        Self {
            session,
            is_admin: true,
        }
    }
}

/// A label record before the store has assigned it an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDraft {
    pub article_id: ArticleId,
    pub session: SessionId,
    pub sentence_index: usize,
    pub labels: Vec<u8>,
    pub authors: Vec<usize>,
    pub admin: bool,
}

impl LabelDraft {
    /// A submission where the annotator could not decide
    pub fn undecided(article_id: ArticleId, sentence_index: usize, annotator: &Annotator) -> Self {
        Self {
            article_id,
            session: annotator.session,
            sentence_index,
            labels: Vec::new(),
            authors: Vec::new(),
            admin: annotator.is_admin,
        }
    }

    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> LabelRecord {
        LabelRecord {
            id,
            article_id: self.article_id,
            session: self.session,
            sentence_index: self.sentence_index,
            labels: self.labels,
            authors: self.authors,
            admin: self.admin,
            created_at,
        }
    }
}

/// An immutable, stored annotation of one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub id: i64,
    pub article_id: ArticleId,
    pub session: SessionId,
    pub sentence_index: usize,
    /// One tag per sentence token; empty when the annotator could not decide
    pub labels: Vec<u8>,
    /// Speaker tokens, in article coordinates
    pub authors: Vec<usize>,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

impl LabelRecord {
    pub fn is_undecided(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn has_reported_speech(&self) -> bool {
        self.labels.contains(&REPORTED)
    }
}
