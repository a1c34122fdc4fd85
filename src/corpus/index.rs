//! TextIndex: boundary arithmetic over an article's sentence and paragraph ends
//!
//! Three coordinate systems are nested inside an article: tokens, sentences
//! (runs of tokens, closed by `sentence_ends`) and paragraphs (runs of
//! sentences, closed by `paragraph_ends`). Every translation between them
//! goes through this module so there is exactly one place that knows where
//! the `+ 1`s live.

use thiserror::Error;

/// Errors raised by index arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("sentence {index} out of range (article has {count} sentences)")]
    SentenceOutOfRange { index: usize, count: usize },

    #[error("paragraph {index} out of range (article has {count} paragraphs)")]
    ParagraphOutOfRange { index: usize, count: usize },

    #[error("inverted sentence range {first}..={last}")]
    InvertedRange { first: usize, last: usize },
}

/// Borrowed view over the boundary arrays of one article
#[derive(Debug, Clone, Copy)]
pub struct TextIndex<'a> {
    sentence_ends: &'a [usize],
    paragraph_ends: &'a [usize],
}

impl<'a> TextIndex<'a> {
    /// Wrap boundary arrays that already satisfy the article invariants
    pub fn new(sentence_ends: &'a [usize], paragraph_ends: &'a [usize]) -> Self {
        Self {
            sentence_ends,
            paragraph_ends,
        }
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_ends.len()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraph_ends.len()
    }

    pub fn token_count(&self) -> usize {
        self.sentence_ends.last().map(|last| last + 1).unwrap_or(0)
    }

    /// First and last sentence of a paragraph (inclusive)
    pub fn sentence_range(&self, paragraph: usize) -> Result<(usize, usize), IndexError> {
        let last = *self
            .paragraph_ends
            .get(paragraph)
            .ok_or(IndexError::ParagraphOutOfRange {
                index: paragraph,
                count: self.paragraph_count(),
            })?;
        let first = if paragraph == 0 {
            0
        } else {
            self.paragraph_ends[paragraph - 1] + 1
        };
        Ok((first, last))
    }

    /// First and last token covered by a sentence range (inclusive)
    pub fn token_range(
        &self,
        first_sentence: usize,
        last_sentence: usize,
    ) -> Result<(usize, usize), IndexError> {
        if first_sentence > last_sentence {
            return Err(IndexError::InvertedRange {
                first: first_sentence,
                last: last_sentence,
            });
        }
        self.check_sentence(last_sentence)?;

        let first_token = if first_sentence == 0 {
            0
        } else {
            self.sentence_ends[first_sentence - 1] + 1
        };
        Ok((first_token, self.sentence_ends[last_sentence]))
    }

    /// The paragraph that contains a sentence
    pub fn paragraph_of(&self, sentence: usize) -> Result<usize, IndexError> {
        self.check_sentence(sentence)?;
        // paragraph_ends is strictly increasing: the owning paragraph is the
        // first one whose end is >= sentence.
        let paragraph = self.paragraph_ends.partition_point(|&end| end < sentence);
        if paragraph < self.paragraph_count() {
            Ok(paragraph)
        } else {
            Err(IndexError::SentenceOutOfRange {
                index: sentence,
                count: self.sentence_count(),
            })
        }
    }

    /// Number of tokens in a single sentence
    pub fn sentence_token_len(&self, sentence: usize) -> Result<usize, IndexError> {
        let (first, last) = self.token_range(sentence, sentence)?;
        Ok(last - first + 1)
    }

    pub fn is_paragraph_start(&self, sentence: usize) -> Result<bool, IndexError> {
        let (first, _) = self.sentence_range(self.paragraph_of(sentence)?)?;
        Ok(first == sentence)
    }

    pub fn is_paragraph_end(&self, sentence: usize) -> Result<bool, IndexError> {
        let (_, last) = self.sentence_range(self.paragraph_of(sentence)?)?;
        Ok(last == sentence)
    }

    fn check_sentence(&self, sentence: usize) -> Result<(), IndexError> {
        if sentence < self.sentence_count() {
            Ok(())
        } else {
            Err(IndexError::SentenceOutOfRange {
                index: sentence,
                count: self.sentence_count(),
            })
        }
    }
}

/// Translate a window-relative token index into article coordinates
pub fn relative_to_global(local: usize, window_first_token: usize) -> usize {
    local + window_first_token
}

/// Translate an article token index into window coordinates
///
/// Returns `None` when the token precedes the window.
pub fn global_to_relative(global: usize, window_first_token: usize) -> Option<usize> {
    global.checked_sub(window_first_token)
}
