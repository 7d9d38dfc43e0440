//! Candidate phrase extraction with canonicalization and filtering
//!
//! Phrases are sliding n-gram windows over a document's tokens. Each window
//! goes through three stages:
//!
//! 1. Component check: no stopword or banned token, every token eligible
//!    under the [`TokenPolicy`]
//! 2. Canonicalization through the [`SynonymTable`]
//! 3. The [`BanFilter`] on the canonical form
//!
//! The per-category [`AllowFilter`] never drops a phrase; it only decides
//! whether a mention is flagged as allowed.

use crate::config::PhraseConfig;
use crate::error::{Error, Result};
use crate::models::{Document, Mention};
use crate::text::{tokenize, tokens_to_text, StopwordList, TokenPolicy};
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Normalize a configured phrase into the same form n-grams take
fn canonical_form(raw: &str) -> String {
    tokens_to_text(&tokenize(raw))
}

/// Compile a case-insensitive pattern
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Immutable many-to-one mapping from variant spellings to canonical phrases
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    lookup: HashMap<String, String>,
    variants: BTreeMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Build the table from canonical keys and their variant lists
    ///
    /// Keys always map to themselves. When a variant is listed under more
    /// than one key, the alphabetically first key wins.
    pub fn new(synonyms: &BTreeMap<String, Vec<String>>) -> Self {
        let mut lookup = HashMap::new();
        let mut variants: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let keys: Vec<(String, &Vec<String>)> = synonyms
            .iter()
            .map(|(key, forms)| (canonical_form(key), forms))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        for (key, _) in &keys {
            lookup.insert(key.clone(), key.clone());
        }
        for (key, forms) in &keys {
            let entry = variants.entry(key.clone()).or_default();
            for form in forms.iter().map(|f| canonical_form(f)) {
                if form.is_empty() || form == *key {
                    continue;
                }
                lookup.entry(form.clone()).or_insert_with(|| key.clone());
                if !entry.contains(&form) {
                    entry.push(form);
                }
            }
        }

        Self { lookup, variants }
    }

    /// Replace a phrase with its canonical key, or pass it through unchanged
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use trendline::analytics::phrases::SynonymTable;
    ///
    /// let mut raw = BTreeMap::new();
    /// raw.insert("air fryer".to_string(), vec!["Air-Fryer".to_string(), "airfryer".to_string()]);
    /// let table = SynonymTable::new(&raw);
    ///
    /// assert_eq!(table.canonicalize("air-fryer"), "air fryer");
    /// assert_eq!(table.canonicalize("slow cooker"), "slow cooker");
    /// ```
    #[must_use]
    pub fn canonicalize(&self, phrase: &str) -> String {
        let key = phrase.trim().to_lowercase();
        match self.lookup.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    /// Every known spelling of a canonical phrase, the key first
    #[must_use]
    pub fn forms(&self, canonical: &str) -> Vec<String> {
        let mut forms = vec![canonical.to_string()];
        if let Some(variants) = self.variants.get(canonical) {
            forms.extend(variants.iter().cloned());
        }
        forms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Rejects banned phrases and banned n-gram components
#[derive(Debug, Clone, Default)]
pub struct BanFilter {
    patterns: Vec<Regex>,
    banlist: HashSet<String>,
    entities: HashSet<String>,
}

impl BanFilter {
    /// Compile ban patterns; an invalid pattern is a configuration error
    pub fn new(banlist: &[String], ban_regex: &[String], ban_entities: &[String]) -> Result<Self> {
        let patterns = ban_regex
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(compile_pattern)
            .collect::<Result<Vec<_>>>()?;

        let normalize = |items: &[String]| -> HashSet<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Ok(Self {
            patterns,
            banlist: normalize(banlist),
            entities: normalize(ban_entities),
        })
    }

    /// Whether a single token disqualifies any window containing it
    #[must_use]
    pub fn is_banned_token(&self, token: &str) -> bool {
        self.banlist.contains(token) || self.entities.contains(token)
    }

    /// Whether a canonical phrase must never reach the outputs
    ///
    /// # Examples
    ///
    /// ```
    /// use trendline::analytics::phrases::BanFilter;
    ///
    /// let filter = BanFilter::new(
    ///     &["click here".to_string()],
    ///     &[r"\bgiveaway\b".to_string()],
    ///     &["acme corp".to_string()],
    /// ).unwrap();
    ///
    /// assert!(filter.is_banned("click here"));
    /// assert!(filter.is_banned("holiday giveaway"));
    /// assert!(filter.is_banned("acme corp"));
    /// assert!(filter.is_banned("-led strip"));
    /// assert!(filter.is_banned("2024"));
    /// assert!(!filter.is_banned("led strip"));
    /// ```
    #[must_use]
    pub fn is_banned(&self, phrase: &str) -> bool {
        let p = phrase.to_lowercase();
        if self.patterns.iter().any(|r| r.is_match(&p)) {
            return true;
        }
        if self.banlist.contains(&p) || self.entities.contains(&p) {
            return true;
        }
        if p.starts_with('-') || p.ends_with('-') {
            return true;
        }
        !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Per-category soft filter
#[derive(Debug, Clone, Default)]
pub struct AllowFilter {
    by_category: HashMap<String, Vec<Regex>>,
}

impl AllowFilter {
    pub fn new(allowlist: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut by_category = HashMap::new();
        for (category, patterns) in allowlist {
            let compiled = patterns
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(compile_pattern)
                .collect::<Result<Vec<_>>>()?;
            by_category.insert(category.trim().to_lowercase(), compiled);
        }
        Ok(Self { by_category })
    }

    /// A category without patterns lets every phrase through
    #[must_use]
    pub fn passes(&self, phrase: &str, category: &str) -> bool {
        match self.by_category.get(&category.trim().to_lowercase()) {
            Some(patterns) if !patterns.is_empty() => patterns.iter().any(|r| r.is_match(phrase)),
            _ => true,
        }
    }
}

/// Compiled filter set, built once per run and shared by every component
#[derive(Debug, Clone, Default)]
pub struct PhraseFilters {
    pub synonyms: SynonymTable,
    pub ban: BanFilter,
    pub allow: AllowFilter,
}

/// Generates filtered phrase mentions from documents
#[derive(Debug, Clone)]
pub struct PhraseExtractor {
    ngram_min: usize,
    ngram_max: usize,
    min_phrase_tokens: usize,
    policy: TokenPolicy,
    stopwords: StopwordList,
    filters: PhraseFilters,
}

impl PhraseExtractor {
    pub fn new(config: &PhraseConfig, filters: PhraseFilters) -> Self {
        Self {
            ngram_min: config.ngram_min.max(1),
            ngram_max: config.ngram_max.max(config.ngram_min.max(1)),
            min_phrase_tokens: config.min_phrase_tokens.max(1),
            policy: TokenPolicy {
                min_len: config.min_token_len,
                reject_numeric: config.reject_numeric_tokens,
            },
            stopwords: config.stopwords,
            filters,
        }
    }

    #[must_use]
    pub fn filters(&self) -> &PhraseFilters {
        &self.filters
    }

    fn is_component(&self, token: &str) -> bool {
        !self.stopwords.contains(token)
            && !self.filters.ban.is_banned_token(token)
            && self.policy.is_eligible(token)
    }

    /// Raw n-gram windows whose every token is an acceptable component
    ///
    /// The iterator is lazy and can be re-created from the same tokens.
    pub fn candidates<'a>(&'a self, tokens: &'a [String]) -> impl Iterator<Item = String> + 'a {
        let usable: Vec<bool> = tokens.iter().map(|t| self.is_component(t)).collect();
        (self.ngram_min..=self.ngram_max).flat_map(move |n| {
            let usable = usable.clone();
            tokens
                .windows(n)
                .enumerate()
                .filter(move |(i, _)| usable[*i..*i + n].iter().all(|ok| *ok))
                .map(|(_, window)| tokens_to_text(window))
        })
    }

    /// Canonical phrases that survive the ban filter and the minimum width
    pub fn extract<'a>(&'a self, tokens: &'a [String]) -> impl Iterator<Item = String> + 'a {
        self.candidates(tokens)
            .map(|phrase| self.filters.synonyms.canonicalize(&phrase))
            .filter(|phrase| !self.filters.ban.is_banned(phrase))
            .filter(|phrase| phrase.split(' ').count() >= self.min_phrase_tokens)
    }

    /// One mention per phrase occurrence in a document
    pub fn mentions(&self, doc: &Document) -> Vec<Mention> {
        let tokens = tokenize(&doc.text());
        self.extract(&tokens)
            .map(|phrase| Mention {
                allowed: self.filters.allow.passes(&phrase, &doc.category),
                phrase,
                category: doc.category.clone(),
                source: doc.source.clone(),
                timestamp: doc.timestamp,
                url: doc.url.clone(),
            })
            .collect()
    }

    /// Mentions for every document, grouped per document in input order
    pub fn extract_documents(&self, docs: &[Document]) -> Vec<Vec<Mention>> {
        docs.par_iter().map(|doc| self.mentions(doc)).collect()
    }
}

/// Keeps phrases whose document frequency lies within configured bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentFrequencyFilter {
    /// Minimum number of documents containing the phrase
    pub min_documents: usize,

    /// Maximum share of documents containing the phrase
    pub max_share: f64,
}

impl DocumentFrequencyFilter {
    pub fn from_config(config: &PhraseConfig) -> Self {
        Self {
            min_documents: config.min_document_frequency,
            max_share: config.max_document_frequency,
        }
    }

    /// Flatten per-document mentions, dropping phrases outside the bounds
    pub fn apply(&self, per_document: Vec<Vec<Mention>>) -> Vec<Mention> {
        let n_docs = per_document.len();
        let mut frequency: HashMap<String, usize> = HashMap::new();
        for mentions in &per_document {
            let distinct: HashSet<&str> = mentions.iter().map(|m| m.phrase.as_str()).collect();
            for phrase in distinct {
                *frequency.entry(phrase.to_string()).or_default() += 1;
            }
        }

        let max_documents = self.max_share * n_docs as f64;
        let keep: HashSet<String> = frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.min_documents && (*df as f64) <= max_documents)
            .map(|(phrase, _)| phrase)
            .collect();

        let before: usize = per_document.iter().map(Vec::len).sum();
        let kept: Vec<Mention> = per_document
            .into_iter()
            .flatten()
            .filter(|m| keep.contains(&m.phrase))
            .collect();

        tracing::debug!(
            documents = n_docs,
            phrases = keep.len(),
            dropped_mentions = before - kept.len(),
            "Applied document-frequency filter"
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;
    use chrono::{TimeZone, Utc};

    fn extractor(filters: PhraseFilters) -> PhraseExtractor {
        PhraseExtractor::new(&PhraseConfig::default(), filters)
    }

    fn doc(category: &str, title: &str) -> Document {
        Document {
            source: SourceKind::Reddit,
            category: category.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
            title: title.to_string(),
            body: String::new(),
            url: Some("https://example.com/a".to_string()),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn test_candidates_skip_stopwords_and_numbers() {
        let ex = extractor(PhraseFilters::default());
        let toks = tokens("the best air fryer recipes 2024");
        let phrases: Vec<String> = ex.candidates(&toks).collect();
        assert!(phrases.contains(&"best air".to_string()));
        assert!(phrases.contains(&"air fryer recipes".to_string()));
        assert!(phrases.contains(&"best air fryer recipes".to_string()));
        assert!(!phrases.iter().any(|p| p.contains("the")));
        assert!(!phrases.iter().any(|p| p.contains("2024")));
    }

    #[test]
    fn test_candidates_are_restartable() {
        let ex = extractor(PhraseFilters::default());
        let toks = tokens("cozy holiday lights display");
        let first: Vec<String> = ex.candidates(&toks).collect();
        let second: Vec<String> = ex.candidates(&toks).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3 + 2 + 1);
    }

    #[test]
    fn test_synonym_first_key_wins() {
        let mut raw = BTreeMap::new();
        raw.insert("b canonical".to_string(), vec!["shared form".to_string()]);
        raw.insert("a canonical".to_string(), vec!["Shared Form".to_string()]);
        let table = SynonymTable::new(&raw);
        assert_eq!(table.canonicalize("shared form"), "a canonical");
        assert_eq!(table.canonicalize("b canonical"), "b canonical");
        assert_eq!(table.forms("a canonical"), vec!["a canonical", "shared form"]);
    }

    #[test]
    fn test_extract_canonicalizes_then_bans() {
        let mut raw = BTreeMap::new();
        raw.insert("air fryer".to_string(), vec!["airfryer oven".to_string()]);
        let filters = PhraseFilters {
            synonyms: SynonymTable::new(&raw),
            ban: BanFilter::new(&[], &["^air fryer$".to_string()], &[]).unwrap(),
            allow: AllowFilter::default(),
        };
        let ex = extractor(filters);
        let toks = tokens("airfryer oven deals");
        let phrases: Vec<String> = ex.extract(&toks).collect();
        assert!(!phrases.contains(&"air fryer".to_string()));
        assert!(!phrases.contains(&"airfryer oven".to_string()));
        assert!(phrases.contains(&"oven deals".to_string()));
    }

    #[test]
    fn test_banned_token_discards_window() {
        let filters = PhraseFilters {
            ban: BanFilter::new(&["sponsored".to_string()], &[], &[]).unwrap(),
            ..PhraseFilters::default()
        };
        let ex = extractor(filters);
        let toks = tokens("sponsored holiday lights");
        let phrases: Vec<String> = ex.extract(&toks).collect();
        assert_eq!(phrases, vec!["holiday lights"]);
    }

    #[test]
    fn test_hyphen_edges_banned() {
        let ban = BanFilter::default();
        assert!(ban.is_banned("-low carb"));
        assert!(ban.is_banned("carb recipes-"));
        assert!(!ban.is_banned("low-carb recipes"));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let err = BanFilter::new(&[], &["(broken".to_string()], &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_allow_filter_is_soft() {
        let mut allow = BTreeMap::new();
        allow.insert("Cooking".to_string(), vec!["fryer".to_string()]);
        let filters = PhraseFilters {
            allow: AllowFilter::new(&allow).unwrap(),
            ..PhraseFilters::default()
        };
        let ex = extractor(filters);

        let mentions = ex.mentions(&doc("cooking", "air fryer holiday lights"));
        let fryer = mentions.iter().find(|m| m.phrase == "air fryer").unwrap();
        let lights = mentions.iter().find(|m| m.phrase == "holiday lights").unwrap();
        assert!(fryer.allowed);
        assert!(!lights.allowed);

        let other = ex.mentions(&doc("decor", "holiday lights"));
        assert!(other.iter().all(|m| m.allowed));
    }

    #[test]
    fn test_single_tokens_excluded() {
        let config = PhraseConfig {
            ngram_min: 1,
            ngram_max: 2,
            ..PhraseConfig::default()
        };
        let ex = PhraseExtractor::new(&config, PhraseFilters::default());
        let toks = tokens("holiday lights");
        let phrases: Vec<String> = ex.extract(&toks).collect();
        assert_eq!(phrases, vec!["holiday lights"]);
    }

    #[test]
    fn test_document_frequency_bounds() {
        let ex = extractor(PhraseFilters::default());
        let mut docs: Vec<Document> = (0..4).map(|_| doc("decor", "holiday lights")).collect();
        docs.extend((0..6).map(|_| doc("decor", "garden tools")));
        docs.push(doc("decor", "rare phrase"));

        let per_doc = ex.extract_documents(&docs);
        let filter = DocumentFrequencyFilter {
            min_documents: 4,
            max_share: 0.5,
        };
        let kept = filter.apply(per_doc);

        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|m| m.phrase == "holiday lights"));
    }
}
