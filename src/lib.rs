//! Quotelab: Annotation Task Engine for reported-speech corpora
//!
//! Hands units of text (sentences or paragraphs) to human annotators who
//! mark reported speech and its speakers, and merges their independent
//! annotations into a labeled corpus.
//!
//! # Core Concepts
//!
//! - **Articles**: tokens grouped into sentences and paragraphs, with
//!   per-sentence label counts and model confidences
//! - **Tasks**: the next sentence (or, for admins, paragraph) to annotate
//! - **Windows**: extra context an annotator loads around a task
//! - **Consensus**: the majority label of a sentence across annotators
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quotelab::{AnnotationApi, AnnotationEngine, Annotator, MemoryStore, SessionId};
//!
//! let engine = AnnotationEngine::new(Arc::new(MemoryStore::new()));
//! let api = AnnotationApi::new(Arc::new(engine));
//! // No articles yet: nothing to annotate
//! assert!(api.next_task(&Annotator::new(SessionId::new())).unwrap().is_none());
//! ```

pub mod api;
pub mod config;
mod corpus;
pub mod labeling;
pub mod storage;
pub mod task;

pub use api::{AnnotationApi, ArticleInfo, TaskOutcome};
pub use config::{ConfigError, EngineConfig};
pub use corpus::{
    global_to_relative, relative_to_global, AnnotationEngine, Annotator, Article,
    ArticleCounters, ArticleDraft, ArticleId, CounterSnapshot, EngineError, EngineResult,
    ErrorKind, IndexError, LabelDraft, LabelRecord, SessionId, TextIndex, ValidationError,
    MAX_CONFIDENCE, PLAIN, REPORTED,
};
pub use labeling::{
    AuthorPolicy, Consensus, ConsensusEngine, ConsensusResult, ReviewOutcome, SubmissionOutcome,
};
pub use storage::{ArticleStore, MemoryStore, OpenStore, SqliteStore, StorageError, StorageResult};
pub use task::{AssignedTask, Granularity, Task, TaskSelector, Window};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
