//! Closed-vocabulary term counting
//!
//! A term is counted once per document whose token sequence contains the
//! term's tokens contiguously. When the term is a synonym key, any of its
//! variant spellings also counts.

use super::phrases::SynonymTable;
use crate::models::PeriodBucket;
use crate::text::tokenizer::has_letter;
use crate::text::{tokenize, StopwordList};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Tokens of one document together with its bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedDocument {
    pub bucket: PeriodBucket,
    pub tokens: Vec<String>,
}

/// Whether `needle` occurs contiguously in `haystack`
#[must_use]
pub fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

#[derive(Debug, Clone)]
struct TermPattern {
    term: String,
    forms: Vec<Vec<String>>,
}

impl TermPattern {
    fn matches(&self, tokens: &[String]) -> bool {
        self.forms.iter().any(|form| contains_sequence(tokens, form))
    }
}

/// Counts documents mentioning each configured term, per bucket
#[derive(Debug, Clone)]
pub struct TermCounter {
    patterns: Vec<TermPattern>,
}

impl TermCounter {
    /// Terms are canonicalized first; spellings of one canonical phrase
    /// collapse into a single term at its first position.
    pub fn new(terms: &[String], synonyms: &SynonymTable) -> Self {
        let mut seen = HashSet::new();
        let patterns = terms
            .iter()
            .map(|term| synonyms.canonicalize(term))
            .filter(|term| !term.is_empty() && seen.insert(term.clone()))
            .map(|term| {
                let mut forms: Vec<Vec<String>> = Vec::new();
                for spelling in synonyms.forms(&term) {
                    let tokens = tokenize(&spelling);
                    if !tokens.is_empty() && !forms.contains(&tokens) {
                        forms.push(tokens);
                    }
                }
                TermPattern { term, forms }
            })
            .collect();
        Self { patterns }
    }

    /// Configured terms in input order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.term.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// term -> bucket -> number of matching documents (sparse)
    ///
    /// Every term has an entry, even when nothing matched.
    pub fn count(&self, docs: &[TokenizedDocument]) -> BTreeMap<String, BTreeMap<PeriodBucket, u64>> {
        self.patterns
            .par_iter()
            .map(|pattern| {
                let mut buckets: BTreeMap<PeriodBucket, u64> = BTreeMap::new();
                for doc in docs.iter().filter(|d| pattern.matches(&d.tokens)) {
                    *buckets.entry(doc.bucket).or_insert(0) += 1;
                }
                (pattern.term.clone(), buckets)
            })
            .collect()
    }
}

fn sorted_counts(counts: HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut out: Vec<(String, u64)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

fn is_content_word(token: &str, stopwords: StopwordList) -> bool {
    has_letter(token) && !stopwords.contains(token)
}

/// Unigram counts over all documents, stopwords removed
///
/// Sorted by count descending, then alphabetically.
#[must_use]
pub fn top_words(docs: &[TokenizedDocument], stopwords: StopwordList) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for token in docs.iter().flat_map(|d| d.tokens.iter()) {
        if is_content_word(token, stopwords) {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
    }
    sorted_counts(counts)
}

/// Adjacent-pair counts where neither word is a stopword
#[must_use]
pub fn top_bigrams(docs: &[TokenizedDocument], stopwords: StopwordList) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for doc in docs {
        for pair in doc.tokens.windows(2) {
            if is_content_word(&pair[0], stopwords) && is_content_word(&pair[1], stopwords) {
                *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
            }
        }
    }
    sorted_counts(counts)
}
