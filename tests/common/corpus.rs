//! Annotated French test articles
//!
//! Two short articles with their reference token labels and speaker
//! positions. `look_above` / `look_below` list the sentences whose speaker
//! sits outside the sentence, so annotating them needs extra context.

#![allow(dead_code)]

use quotelab::ArticleDraft;

/// A tokenized article with its reference annotation
#[derive(Debug)]
pub struct FixtureArticle {
    pub title: &'static str,
    /// Tokens grouped by sentence
    pub tokens: &'static [&'static [&'static str]],
    pub in_quotes: &'static [&'static [u8]],
    /// Reference labels per sentence
    pub labels: &'static [&'static [u8]],
    /// Reference speakers per sentence, article coordinates
    pub authors: &'static [&'static [usize]],
    pub sentence_ends: &'static [usize],
    pub paragraph_ends: &'static [usize],
    /// Sentences annotated with the context above loaded
    pub look_above: &'static [usize],
    /// Sentences annotated with the context below loaded
    pub look_below: &'static [usize],
}

impl FixtureArticle {
    /// The ingestion payload for this article
    pub fn draft(&self) -> ArticleDraft {
        ArticleDraft {
            title: self.title.to_string(),
            tokens: self
                .tokens
                .iter()
                .flat_map(|sentence| sentence.iter().map(|t| t.to_string()))
                .collect(),
            sentence_ends: self.sentence_ends.to_vec(),
            paragraph_ends: self.paragraph_ends.to_vec(),
            in_quotes: self
                .in_quotes
                .iter()
                .flat_map(|sentence| sentence.iter().map(|&flag| flag == 1))
                .collect(),
            admin_only: false,
        }
    }

    pub fn sentence_count(&self) -> usize {
        self.sentence_ends.len()
    }

    pub fn sentence_tokens(&self, sentence: usize) -> Vec<String> {
        self.tokens[sentence].iter().map(|t| t.to_string()).collect()
    }

    /// Reference labels of sentences `first..=last`, concatenated
    pub fn labels_between(&self, first: usize, last: usize) -> Vec<u8> {
        self.labels[first..=last]
            .iter()
            .flat_map(|sentence| sentence.iter().copied())
            .collect()
    }

    /// Zero labels covering sentences `first..=last`
    pub fn plain_between(&self, first: usize, last: usize) -> Vec<u8> {
        vec![0; self.labels_between(first, last).len()]
    }
}

pub static FOOTBALL: FixtureArticle = FixtureArticle {
    title: "Le football",
    tokens: &[
        &["Le ", "fameux ", "joueur ", "de ", "football ", "Diego ", "Maradona ", "est ",
          "meilleur ", "que ", "Lionel ", "Messi", ". "],
        &["Du ", "moins", ", ", "c'", "est ", "ce ", "que ", "pense ", "Serge ", "Aurier", ". "],
        &["Il ", "l'", "affirme ", "dans ", "un ", "interview ", "avec ", "L'", "Equipe", ". "],
        &["Il ", "pense ", "que ", "sa ", "victoire ", "en ", "coupe ", "du ", "monde ", "est ",
          "plus ", "importante ", "que ", "les ", "victoires ", "individuelles ", "de ", "lutin ",
          "du ", "FC ", "Barcelone", "."],
        &["Il ", "ne ", "pense ", "pas ", "que ", "Messi ", "pourra ", "un ", "jour ", "gagner ",
          "une ", "coupe ", "du ", "monde", ". "],
        &["Mais ", "Platini ", "nous ", "informe ", "qu'", "en ", "fait ", "c'", "est ", "lui ",
          "\"", "le ", "meilleur ", "joueur ", "du ", "monde", "\"", ". "],
        &["Et ", "que ", "\"", "ça ", "n'", "a ", "rien ", "à ", "voir ", "avec ", "son ", "ego",
          "\"", "."],
        &["Mais ", "au ", "final", ", ", "c'", "est ", "vraiement ", "Wayne ", "Rooney", ", ",
          "le ", "meilleur ", "joueur ", "de ", "tous ", "les ", "temps", ". "],
        &["C'", "est ", "indiscutable", ". "],
        &["Même ", "Zlatan ", "le ", "dit", ": ", "\"", "Personne ", "n'", "est ", "meilleur ",
          "que ", "Wayne", "\"", "."],
    ],
    in_quotes: &[
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 0, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0],
    ],
    labels: &[
        &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0],
    ],
    authors: &[&[21, 22], &[], &[], &[21, 22], &[], &[72], &[72], &[], &[], &[126]],
    sentence_ends: &[12, 23, 33, 55, 70, 88, 102, 120, 124, 138],
    paragraph_ends: &[3, 6, 9],
    look_above: &[3, 6],
    look_below: &[0],
};

pub static SANS_SENS: FixtureArticle = FixtureArticle {
    title: "Article sans sens.",
    tokens: &[
        &["Cet ", "article ", "est ", "utilisé ", "pour ", "tester ", "l'", "implémentation ",
          "du ", "gender ", "tracker", ". "],
        &["Une ", "citation ", "\"", "est ", "bien ", "plus ", "importante ", "que ", "la ",
          "véracité ", "des ", "dires", "\"", ", ", "répond ", "Pierre", ". "],
        &["Michel ", "Schmid ", "ne ", "dit ", "rien", ". "],
        &["Il ", "criait ", "pourtant ", "plus ", "tôt ", "que ", "\"", "rien ", "n'", "est ",
          "mieux ", "qu'", "un ", "code ", "bien ", "commenté", "\"", "."],
        &["Alain ", "est ", "d'", "un ", "avis ", "différent", ". "],
        &["Pour ", "lui", ", ", "les ", "tests ", "sont ", "la ", "partie ", "la ", "plus ",
          "importante ", "du ", "code", ". "],
        &["Il ", "pense ", "que ", "c'", "est ", "plus ", "important ", "que ", "le ", "reste", "."],
    ],
    in_quotes: &[
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ],
    labels: &[
        &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
        &[0, 0, 0, 0, 0, 0, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
        &[0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0],
    ],
    authors: &[&[], &[27], &[], &[29, 30], &[], &[53], &[53]],
    sentence_ends: &[11, 28, 34, 52, 59, 73, 84],
    paragraph_ends: &[3, 6],
    look_above: &[3, 5, 6],
    look_below: &[],
};
