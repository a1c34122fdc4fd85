//! WindowExpander: loads extra context around a sentence range
//!
//! Expansion works in whole sentences. Inside a paragraph it reaches the
//! paragraph edge; from a paragraph edge it takes the whole neighbouring
//! paragraph. A client that keeps asking therefore walks outwards one
//! paragraph at a time.

use super::types::Window;
use crate::corpus::{AnnotationEngine, Article, ArticleId, EngineError, EngineResult};

/// Sentences `first..=last` that precede `first`, or `None` at the top
pub fn expand_above(article: &Article, first: usize) -> EngineResult<Option<(usize, usize)>> {
    let index = article.index();
    let paragraph = index.paragraph_of(first)?;
    let (start, _) = index.sentence_range(paragraph)?;
    if first > start {
        return Ok(Some((start, first - 1)));
    }
    if paragraph == 0 {
        return Ok(None);
    }
    Ok(Some(index.sentence_range(paragraph - 1)?))
}

/// Sentences `first..=last` that follow `last`, or `None` at the bottom
pub fn expand_below(article: &Article, last: usize) -> EngineResult<Option<(usize, usize)>> {
    let index = article.index();
    let paragraph = index.paragraph_of(last)?;
    let (_, end) = index.sentence_range(paragraph)?;
    if last < end {
        return Ok(Some((last + 1, end)));
    }
    if paragraph + 1 == index.paragraph_count() {
        return Ok(None);
    }
    Ok(Some(index.sentence_range(paragraph + 1)?))
}

fn window(article: &Article, first: usize, last: usize) -> EngineResult<Window> {
    let (first_token, _) = article.index().token_range(first, last)?;
    Ok(Window {
        article_id: article.id,
        tokens: article.tokens_between(first, last)?.to_vec(),
        first_sentence: first,
        last_sentence: last,
        first_token,
    })
}

impl AnnotationEngine {
    /// Context immediately above sentence `first`
    pub fn context_above(&self, article_id: ArticleId, first: usize) -> EngineResult<Window> {
        let article = self.article(article_id)?;
        match expand_above(&article, first)? {
            Some((from, to)) => window(&article, from, to),
            None => Err(EngineError::NoContextAbove {
                article: article_id,
                sentence: first,
            }),
        }
    }

    /// Context immediately below sentence `last`
    pub fn context_below(&self, article_id: ArticleId, last: usize) -> EngineResult<Window> {
        let article = self.article(article_id)?;
        match expand_below(&article, last)? {
            Some((from, to)) => window(&article, from, to),
            None => Err(EngineError::NoContextBelow {
                article: article_id,
                sentence: last,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ArticleDraft, ErrorKind};
    use crate::storage::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    /// Three sentences of three tokens; paragraphs {0, 1} and {2}
    fn small() -> Article {
        ArticleDraft {
            title: "small".to_string(),
            tokens: (0..9).map(|i| format!("t{i}")).collect(),
            sentence_ends: vec![2, 5, 8],
            paragraph_ends: vec![1, 2],
            in_quotes: Vec::new(),
            admin_only: false,
        }
        .into_article(ArticleId::new(1), Utc::now())
    }

    /// Seven one-token sentences; paragraphs {0, 1, 2}, {3, 4}, {5, 6}
    fn wide() -> Article {
        ArticleDraft {
            title: "wide".to_string(),
            tokens: (0..7).map(|i| format!("s{i}")).collect(),
            sentence_ends: (0..7).collect(),
            paragraph_ends: vec![2, 4, 6],
            in_quotes: Vec::new(),
            admin_only: false,
        }
        .into_article(ArticleId::new(2), Utc::now())
    }

    #[test]
    fn above_takes_previous_paragraph_from_its_start() {
        let article = small();
        assert_eq!(expand_above(&article, 2).unwrap(), Some((0, 1)));
        assert_eq!(expand_above(&article, 1).unwrap(), Some((0, 0)));
        assert_eq!(expand_above(&article, 0).unwrap(), None);
    }

    #[test]
    fn above_stops_at_paragraph_start() {
        let article = wide();
        assert_eq!(expand_above(&article, 4).unwrap(), Some((3, 3)));
        assert_eq!(expand_above(&article, 2).unwrap(), Some((0, 1)));
        assert_eq!(expand_above(&article, 3).unwrap(), Some((0, 2)));
    }

    #[test]
    fn below_mirrors_above() {
        let article = small();
        assert_eq!(expand_below(&article, 0).unwrap(), Some((1, 1)));
        assert_eq!(expand_below(&article, 1).unwrap(), Some((2, 2)));
        assert_eq!(expand_below(&article, 2).unwrap(), None);

        let article = wide();
        assert_eq!(expand_below(&article, 3).unwrap(), Some((4, 4)));
        assert_eq!(expand_below(&article, 4).unwrap(), Some((5, 6)));
    }

    #[test]
    fn repeated_expansion_walks_paragraph_by_paragraph() {
        let article = wide();
        let mut first = 6;
        let mut seen = Vec::new();
        while let Some((from, to)) = expand_above(&article, first).unwrap() {
            assert_eq!(to + 1, first, "windows must be adjacent");
            seen.push((from, to));
            first = from;
        }
        assert_eq!(seen, vec![(5, 5), (3, 4), (0, 2)]);
    }

    #[test]
    fn out_of_range_sentence_is_an_index_error() {
        let article = small();
        assert!(matches!(expand_above(&article, 3), Err(EngineError::Index(_))));
        assert!(matches!(expand_below(&article, 9), Err(EngineError::Index(_))));
    }

    #[test]
    fn engine_windows_carry_tokens_and_offsets() {
        let engine = AnnotationEngine::new(Arc::new(MemoryStore::new()));
        let id = engine
            .import_article(ArticleDraft {
                title: "small".to_string(),
                tokens: (0..9).map(|i| format!("t{i}")).collect(),
                sentence_ends: vec![2, 5, 8],
                paragraph_ends: vec![1, 2],
                in_quotes: Vec::new(),
                admin_only: false,
            })
            .unwrap()
            .id;

        let above = engine.context_above(id, 2).unwrap();
        assert_eq!((above.first_sentence, above.last_sentence), (0, 1));
        assert_eq!(above.first_token, 0);
        assert_eq!(above.tokens.len(), 6);

        let below = engine.context_below(id, 0).unwrap();
        assert_eq!(below.first_token, 3);
        assert_eq!(below.tokens, vec!["t3", "t4", "t5"]);

        let err = engine.context_above(id, 0).unwrap_err();
        assert!(matches!(err, EngineError::NoContextAbove { sentence: 0, .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(engine.context_below(id, 2).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            engine.context_above(ArticleId::new(99), 1).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
