//! Configuration management for the trend-signal engine
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Filter lists and closed-vocabulary term lists
//! live in separate files (see [`filters`]).

pub mod filters;

use crate::error::{Error, Result};
use crate::text::{StopwordList, TokenPolicy};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use filters::{load_terms, FilterConfig, PhraseFilters};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Phrase extraction configuration
    pub phrases: PhraseConfig,

    /// Time bucketing and rolling windows
    pub windows: WindowConfig,

    /// Composite scoring configuration
    pub scoring: ScoringConfig,

    /// Report sizes and output location
    pub report: ReportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Filters file (synonyms, ban and allow lists)
    pub filters_path: Option<PathBuf>,

    /// Closed-vocabulary terms file
    pub terms_path: Option<PathBuf>,
}

/// Phrase extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseConfig {
    /// Smallest n-gram width
    pub ngram_min: usize,

    /// Largest n-gram width
    pub ngram_max: usize,

    /// Minimum characters for an n-gram component
    pub min_token_len: usize,

    /// Reject pure-numeric tokens as n-gram components
    pub reject_numeric_tokens: bool,

    /// Stopword list applied to n-gram components
    pub stopwords: StopwordList,

    /// Minimum number of documents a phrase must appear in
    pub min_document_frequency: usize,

    /// Maximum share of documents a phrase may appear in (0.0 - 1.0]
    pub max_document_frequency: f64,

    /// Minimum tokens for a phrase to reach trend outputs
    pub min_phrase_tokens: usize,
}

/// Time bucketing and rolling window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Width of one aggregation bucket in days (Monday-aligned)
    pub bucket_days: u32,

    /// Short rolling window in days
    pub short_days: u32,

    /// Long rolling window in days
    pub long_days: u32,

    /// How many trailing buckets count as "new"
    pub new_lookback_buckets: usize,

    /// Reference instant for rolling windows (defaults to now)
    pub as_of: Option<DateTime<Utc>>,
}

/// Composite scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the short-window volume z-score
    pub weight_volume: f64,

    /// Weight of the growth-ratio z-score
    pub weight_growth: f64,

    /// Weight of the source-breadth z-score
    pub weight_breadth: f64,

    /// Weight of the recency-share z-score
    pub weight_recency: f64,

    /// Flat boost for phrases passing the category allow-list
    pub allow_boost: f64,

    /// p-value threshold for the "significant" tier
    pub significance: f64,

    /// Overly broad single-token phrases excluded from rankings
    pub generic_terms: Vec<String>,

    /// Maximum representative links per signal
    pub max_links: usize,
}

/// Report sizes and output location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Top-k for closed-vocabulary reports
    pub top_k_terms: usize,

    /// Top-k for open-vocabulary discovery and signals
    pub top_k_signals: usize,

    /// Directory receiving all artifacts
    pub output_dir: PathBuf,

    /// File name prefix for discover/terms artifacts
    pub prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            ngram_min: 2,
            ngram_max: 4,
            min_token_len: 2,
            reject_numeric_tokens: true,
            stopwords: StopwordList::English,
            min_document_frequency: 4,
            max_document_frequency: 0.6,
            min_phrase_tokens: 2,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            bucket_days: 7,
            short_days: 7,
            long_days: 28,
            new_lookback_buckets: 6,
            as_of: None,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_volume: 1.0,
            weight_growth: 1.5,
            weight_breadth: 0.5,
            weight_recency: 0.5,
            allow_boost: 0.4,
            significance: 0.05,
            generic_terms: Vec::new(),
            max_links: 6,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_k_terms: 12,
            top_k_signals: 200,
            output_dir: PathBuf::from("data"),
            prefix: String::from("all"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override values with `TRENDLINE_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_parse("TRENDLINE_NGRAM_MIN") {
            self.phrases.ngram_min = v;
        }
        if let Some(v) = env_parse("TRENDLINE_NGRAM_MAX") {
            self.phrases.ngram_max = v;
        }
        if let Some(v) = env_parse("TRENDLINE_MIN_DF") {
            self.phrases.min_document_frequency = v;
        }
        if let Some(v) = env_parse("TRENDLINE_MAX_DF") {
            self.phrases.max_document_frequency = v;
        }
        if let Some(v) = env_parse("TRENDLINE_BUCKET_DAYS") {
            self.windows.bucket_days = v;
        }
        if let Some(v) = env_parse("TRENDLINE_SHORT_DAYS") {
            self.windows.short_days = v;
        }
        if let Some(v) = env_parse("TRENDLINE_LONG_DAYS") {
            self.windows.long_days = v;
        }
        if let Ok(v) = std::env::var("TRENDLINE_AS_OF") {
            let as_of = DateTime::parse_from_rfc3339(&v)
                .map_err(|e| Error::config(format!("TRENDLINE_AS_OF '{v}': {e}")))?;
            self.windows.as_of = Some(as_of.with_timezone(&Utc));
        }
        if let Ok(v) = std::env::var("TRENDLINE_OUTPUT_DIR") {
            self.report.output_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("TRENDLINE_PREFIX") {
            self.report.prefix = v;
        }
        if let Ok(v) = std::env::var("TRENDLINE_FILTERS") {
            self.filters_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("TRENDLINE_TERMS") {
            self.terms_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("TRENDLINE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("TRENDLINE_LOG_FORMAT") {
            self.logging.format = v;
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    ///
    /// A missing file is a fatal configuration error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing(path));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let p = &self.phrases;
        if p.ngram_min == 0 || p.ngram_min > p.ngram_max {
            return Err(Error::config(format!(
                "ngram range must satisfy 1 <= min <= max, got {}..={}",
                p.ngram_min, p.ngram_max
            )));
        }
        if !(p.max_document_frequency > 0.0 && p.max_document_frequency <= 1.0) {
            return Err(Error::config("max_document_frequency must be in (0, 1]"));
        }

        let w = &self.windows;
        if w.bucket_days == 0 || w.short_days == 0 || w.long_days == 0 {
            return Err(Error::config("window widths must be greater than 0"));
        }
        if w.short_days > w.long_days {
            return Err(Error::config("short_days must not exceed long_days"));
        }
        if w.new_lookback_buckets == 0 {
            return Err(Error::config("new_lookback_buckets must be greater than 0"));
        }

        let s = &self.scoring;
        if !(s.significance > 0.0 && s.significance < 1.0) {
            return Err(Error::config("significance must be in (0, 1)"));
        }

        if self.report.top_k_terms == 0 || self.report.top_k_signals == 0 {
            return Err(Error::config("top-k cutoffs must be greater than 0"));
        }

        Ok(())
    }

    /// Token eligibility policy derived from the phrase settings
    #[must_use]
    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy {
            min_len: self.phrases.min_token_len,
            reject_numeric: self.phrases.reject_numeric_tokens,
        }
    }

    /// Reference instant for rolling windows
    #[must_use]
    pub fn as_of(&self) -> DateTime<Utc> {
        self.windows.as_of.unwrap_or_else(Utc::now)
    }

    /// Bucket width as a Duration
    #[must_use]
    pub fn bucket_width(&self) -> Duration {
        Duration::days(i64::from(self.windows.bucket_days))
    }
}
