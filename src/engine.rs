//! Report orchestration
//!
//! [`SignalEngine`] owns the compiled configuration and runs one of three
//! reports over a document set:
//!
//! - [`SignalEngine::signals`]: composite-scored signal list
//! - [`SignalEngine::discover`]: open-vocabulary phrase discovery
//! - [`SignalEngine::terms`]: closed-vocabulary term trends
//!
//! Reports are plain data; writing them is left to [`crate::output`].

use crate::analytics::keyword_trends::{new_cutoff, TrendAnalyzer, TrendDirection};
use crate::analytics::phrases::{DocumentFrequencyFilter, PhraseExtractor, PhraseFilters};
use crate::analytics::ranking::{pick_tiered, rank_composite, sort_by_score, GenericTermFilter};
use crate::analytics::regression::TrendEstimator;
use crate::analytics::scoring::{CompositeScorer, ScoreWeights};
use crate::analytics::terms::{top_bigrams, top_words, TermCounter, TokenizedDocument};
use crate::analytics::window::{BucketClock, RollingWindows, WindowAggregator, WindowStats};
use crate::config::{Config, FilterConfig};
use crate::error::Result;
use crate::models::{Document, Mention, PeriodBucket, SignalRecord, TierPick, TrendRecord};
use crate::text::tokenize;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// The JSON signal document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalsReport {
    pub generated_at: DateTime<Utc>,
    pub horizon_days: u32,
    pub signals: Vec<SignalRecord>,
}

/// Open-vocabulary discovery results
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryReport {
    /// Every retained phrase, slope descending
    pub records: Vec<TrendRecord>,
    pub increasing: Vec<SignalRecord>,
    pub decreasing: Vec<SignalRecord>,
    /// First seen within the lookback and rising
    pub emerging: Vec<SignalRecord>,
    pub signals: SignalsReport,
}

impl DiscoveryReport {
    /// Trend record for a phrase, if it was retained
    #[must_use]
    pub fn record(&self, phrase: &str) -> Option<&TrendRecord> {
        self.records.iter().find(|r| r.phrase == phrase)
    }
}

/// Closed-vocabulary results
#[derive(Debug, Clone, PartialEq)]
pub struct TermsReport {
    pub top_words: Vec<(String, u64)>,
    pub top_bigrams: Vec<(String, u64)>,
    /// One record per term, p-value ascending
    pub records: Vec<TrendRecord>,
    pub increasing: TierPick,
    pub decreasing: TierPick,
}

/// Runs the trend-signal pipeline with one immutable configuration
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: Config,
    extractor: PhraseExtractor,
    generic: GenericTermFilter,
    clock: BucketClock,
    estimator: TrendEstimator,
}

impl SignalEngine {
    /// Create an engine from a validated configuration and compiled filters
    pub fn new(config: Config, filters: PhraseFilters) -> Result<Self> {
        config.validate()?;
        let extractor = PhraseExtractor::new(&config.phrases, filters);
        let generic = GenericTermFilter::new(&config.scoring.generic_terms);
        let clock = BucketClock::new(config.bucket_width());
        Ok(Self {
            config,
            extractor,
            generic,
            clock,
            estimator: TrendEstimator::default(),
        })
    }

    /// Create an engine, loading the filters file named in the configuration
    ///
    /// A configured but missing filters file is fatal.
    pub fn from_config(config: Config) -> Result<Self> {
        let filters = match &config.filters_path {
            Some(path) => FilterConfig::from_file(path)?.compile()?,
            None => PhraseFilters::default(),
        };
        Self::new(config, filters)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn aggregator(&self, as_of: DateTime<Utc>) -> WindowAggregator {
        let w = &self.config.windows;
        WindowAggregator::new(
            self.clock,
            RollingWindows::new(as_of, w.short_days, w.long_days),
            self.config.scoring.max_links,
        )
    }

    fn scorer(&self) -> CompositeScorer {
        CompositeScorer::new(
            ScoreWeights::from(&self.config.scoring),
            self.config.windows.short_days,
            self.config.windows.long_days,
        )
    }

    fn without_generic(&self, mut stats: BTreeMap<String, WindowStats>) -> BTreeMap<String, WindowStats> {
        stats.retain(|phrase, _| !self.generic.excludes(phrase));
        stats
    }

    fn signals_report(&self, mut signals: Vec<SignalRecord>) -> SignalsReport {
        sort_by_score(&mut signals);
        signals.truncate(self.config.report.top_k_signals);
        SignalsReport {
            generated_at: Utc::now(),
            horizon_days: self.config.windows.long_days,
            signals,
        }
    }

    fn horizon(&self, docs: &[Document]) -> Vec<PeriodBucket> {
        self.clock.horizon_of(docs.iter().map(|d| d.timestamp))
    }

    /// Canonical terms that pass the ban filter
    fn allowed_terms(&self, terms: &[String]) -> Vec<String> {
        let filters = self.extractor.filters();
        let (kept, banned): (Vec<String>, Vec<String>) = terms
            .iter()
            .map(|term| filters.synonyms.canonicalize(term))
            .partition(|term| {
                !filters.ban.is_banned(term)
                    && !tokenize(term).iter().any(|t| filters.ban.is_banned_token(t))
            });
        if !banned.is_empty() {
            tracing::warn!(dropped = banned.len(), "Dropped banned terms");
        }
        kept
    }

    /// Composite-scored signals over phrases seen in the long window
    ///
    /// Rolling windows end at the configured `as_of`, or now.
    pub fn signals(&self, docs: &[Document]) -> SignalsReport {
        let as_of = self.config.as_of();
        let mentions: Vec<Mention> = self
            .extractor
            .extract_documents(docs)
            .into_iter()
            .flatten()
            .collect();

        let mut stats = self.aggregator(as_of).window_stats(&mentions);
        stats.retain(|_, s| s.volume_long > 0);
        let stats = self.without_generic(stats);
        let report = self.signals_report(self.scorer().score(&stats));

        tracing::info!(
            documents = docs.len(),
            mentions = mentions.len(),
            phrases = stats.len(),
            signals = report.signals.len(),
            as_of = %as_of,
            "Built signals"
        );
        report
    }

    /// Open-vocabulary phrase discovery
    ///
    /// Rolling windows end at the configured `as_of`, or at the latest
    /// document when none is configured.
    pub fn discover(&self, docs: &[Document]) -> DiscoveryReport {
        let as_of = self
            .config
            .windows
            .as_of
            .or_else(|| docs.iter().map(|d| d.timestamp).max())
            .unwrap_or_else(Utc::now);

        let per_document = self.extractor.extract_documents(docs);
        let mentions = DocumentFrequencyFilter::from_config(&self.config.phrases).apply(per_document);

        let horizon = self.horizon(docs);
        let aggregator = self.aggregator(as_of);
        let analyzer = TrendAnalyzer::from_counts(aggregator.aggregate(&mentions), self.estimator);
        let mut records = analyzer.records(&horizon);

        let stats = self.without_generic(aggregator.window_stats(&mentions));
        let scored = self.scorer().score(&stats);

        let by_phrase: BTreeMap<String, TrendRecord> = records
            .iter()
            .map(|r| (r.phrase.clone(), r.clone()))
            .collect();
        let cutoff = new_cutoff(&horizon, self.config.windows.new_lookback_buckets);
        let k = self.config.report.top_k_signals;
        let rank = |direction| rank_composite(&scored, &by_phrase, direction, cutoff, &self.generic, k);

        let increasing = rank(TrendDirection::Rising);
        let decreasing = rank(TrendDirection::Falling);
        let emerging = rank(TrendDirection::Emerging);
        let signals = self.signals_report(scored.iter().filter(|s| s.volume_long > 0).cloned().collect());

        records.sort_by(|a, b| {
            b.slope
                .total_cmp(&a.slope)
                .then_with(|| b.total.cmp(&a.total))
                .then_with(|| a.phrase.cmp(&b.phrase))
        });

        tracing::info!(
            documents = docs.len(),
            mentions = mentions.len(),
            phrases = records.len(),
            buckets = horizon.len(),
            increasing = increasing.len(),
            decreasing = decreasing.len(),
            emerging = emerging.len(),
            "Discovered phrases"
        );

        DiscoveryReport {
            records,
            increasing,
            decreasing,
            emerging,
            signals,
        }
    }

    /// Closed-vocabulary trends for the given terms
    pub fn terms(&self, docs: &[Document], terms: &[String]) -> TermsReport {
        let tokenized: Vec<TokenizedDocument> = docs
            .par_iter()
            .map(|doc| TokenizedDocument {
                bucket: self.clock.floor(doc.timestamp),
                tokens: tokenize(&doc.text()),
            })
            .collect();

        let stopwords = self.config.phrases.stopwords;
        let words = top_words(&tokenized, stopwords);
        let bigrams = top_bigrams(&tokenized, stopwords);

        let horizon = self.horizon(docs);
        let terms = self.allowed_terms(terms);
        let counter = TermCounter::new(&terms, &self.extractor.filters().synonyms);
        let mut records = if horizon.is_empty() {
            Vec::new()
        } else {
            TrendAnalyzer::from_counts(counter.count(&tokenized), self.estimator).records(&horizon)
        };
        records.sort_by(|a, b| {
            a.p_value
                .total_cmp(&b.p_value)
                .then_with(|| a.phrase.cmp(&b.phrase))
        });

        let k = self.config.report.top_k_terms;
        let significance = self.config.scoring.significance;
        let increasing = pick_tiered(&records, TrendDirection::Rising, k, significance);
        let decreasing = pick_tiered(&records, TrendDirection::Falling, k, significance);

        tracing::info!(
            documents = docs.len(),
            terms = counter.len(),
            buckets = horizon.len(),
            increasing_tier = %increasing.tier,
            decreasing_tier = %decreasing.tier,
            "Analyzed terms"
        );

        TermsReport {
            top_words: words,
            top_bigrams: bigrams,
            records,
            increasing,
            decreasing,
        }
    }
}
