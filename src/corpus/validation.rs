//! Validation failures for client-supplied payloads

use thiserror::Error;

/// A payload was rejected before any state was touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("article has no tokens")]
    EmptyArticle,

    #[error("{array} must be strictly increasing (violated at position {position})")]
    BoundaryNotIncreasing {
        array: &'static str,
        position: usize,
    },

    #[error("{array} must end at {expected}, found {found}")]
    BoundaryTerminal {
        array: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("in_quotes has {found} flags for {expected} tokens")]
    InQuotesLength { expected: usize, found: usize },

    #[error("sentence {sentence} has {expected} tokens but {found} labels were given")]
    LabelLength {
        sentence: usize,
        expected: usize,
        found: usize,
    },

    #[error("label at position {position} is {value}, expected 0 or 1")]
    LabelValue { position: usize, value: u8 },

    #[error("author token {author} outside {first}..={last}")]
    AuthorOutOfRange {
        author: usize,
        first: usize,
        last: usize,
    },

    #[error("expected {expected} confidence values, found {found}")]
    ConfidenceLength { expected: usize, found: usize },

    #[error("confidence at position {position} is {value}, expected 0..=100")]
    ConfidenceValue { position: usize, value: i32 },

    #[error("no target sentences given")]
    EmptyTargets,

    #[error("target sentences must be contiguous and inside window {first}..={last}")]
    TargetsOutsideWindow { first: usize, last: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}
