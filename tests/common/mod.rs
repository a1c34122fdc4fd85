//! Common test utilities for the annotation engine suites

#![allow(dead_code)]

pub mod corpus;

use quotelab::{AnnotationApi, AnnotationEngine, ArticleStore, EngineConfig, MemoryStore};
use std::sync::Arc;

pub use corpus::{FixtureArticle, FOOTBALL, SANS_SENS};

/// An API over a fresh in-memory store
pub fn memory_api() -> AnnotationApi {
    api_over(Arc::new(MemoryStore::new()), EngineConfig::default())
}

pub fn api_over(store: Arc<dyn ArticleStore>, config: EngineConfig) -> AnnotationApi {
    AnnotationApi::new(Arc::new(AnnotationEngine::with_config(store, config)))
}
