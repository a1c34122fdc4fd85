//! Core corpus data structures and the engine that guards them

mod article;
mod engine;
mod index;
mod label;
mod validation;


pub use article::{
    Article, ArticleCounters, ArticleDraft, ArticleId, CounterSnapshot, MAX_CONFIDENCE,
};
pub use engine::{AnnotationEngine, EngineError, EngineResult, ErrorKind};
pub use index::{global_to_relative, relative_to_global, IndexError, TextIndex};
pub use label::{Annotator, LabelDraft, LabelRecord, SessionId, PLAIN, REPORTED};
pub use validation::ValidationError;
