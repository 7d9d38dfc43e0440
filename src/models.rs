// Core data structures for the trend-signal engine

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Collector that produced a document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    Rss,
    Youtube,
    Reddit,
    GoogleNews,
    Trends,
    Social,
    Other(String),
}

impl SourceKind {
    /// Create from a collector tag (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "rss" | "feed" => Self::Rss,
            "youtube" | "yt" => Self::Youtube,
            "reddit" => Self::Reddit,
            "gnews" | "google_news" | "googlenews" => Self::GoogleNews,
            "trends" | "google_trends" => Self::Trends,
            "social" | "tiktok" | "instagram" => Self::Social,
            "" => Self::Other("other".to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rss => "rss",
            Self::Youtube => "youtube",
            Self::Reddit => "reddit",
            Self::GoogleNews => "gnews",
            Self::Trends => "trends",
            Self::Social => "social",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for SourceKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested document; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source: SourceKind,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

impl Document {
    /// Concatenated title and body
    ///
    /// Some collectors already prefix the body with the title; in that case
    /// the body is used as-is.
    pub fn text(&self) -> String {
        let title = self.title.trim();
        let body = self.body.trim();
        if title.is_empty() {
            body.to_string()
        } else if body.is_empty() {
            title.to_string()
        } else if body.starts_with(title) {
            body.to_string()
        } else {
            format!("{title}\n\n{body}")
        }
    }
}

/// One occurrence of one phrase in one document
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub phrase: String,
    pub category: String,
    pub source: SourceKind,
    pub timestamp: DateTime<Utc>,
    pub url: Option<String>,
    /// False when the category allow-list demoted this phrase
    pub allowed: bool,
}

/// Start of a fixed-width, Monday-aligned aggregation interval (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodBucket(DateTime<Utc>);

impl PeriodBucket {
    /// Wrap an already aligned instant
    pub fn from_start(start: DateTime<Utc>) -> Self {
        Self(start)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl Serialize for PeriodBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.date())
    }
}

impl fmt::Display for PeriodBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date())
    }
}

/// Per-phrase aggregate over the full observed bucket horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecord {
    pub phrase: String,
    pub total: u64,
    /// Dense (bucket, count) series; one entry per horizon bucket
    pub series: Vec<(PeriodBucket, u64)>,
    pub slope: f64,
    pub p_value: f64,
    pub nonzero_buckets: usize,
    pub first_seen: Option<PeriodBucket>,
    pub last_seen: Option<PeriodBucket>,
}

impl TrendRecord {
    /// Build a record from a dense series; slope/p-value start at "no evidence"
    pub fn from_series(phrase: impl Into<String>, series: Vec<(PeriodBucket, u64)>) -> Self {
        let total = series.iter().map(|(_, c)| c).sum();
        let mut seen = series.iter().filter(|(_, c)| *c > 0).map(|(b, _)| *b);
        let first_seen = seen.next();
        let last_seen = seen.last().or(first_seen);
        let nonzero_buckets = series.iter().filter(|(_, c)| *c > 0).count();
        Self {
            phrase: phrase.into(),
            total,
            series,
            slope: 0.0,
            p_value: 1.0,
            nonzero_buckets,
            first_seen,
            last_seen,
        }
    }

    pub fn token_count(&self) -> usize {
        self.phrase.split(' ').count()
    }
}

/// Representative link for a signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// Final ranked output unit of the composite ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub phrase: String,
    /// Dominant category in the long window
    pub category: String,
    pub volume_short: u64,
    pub volume_long: u64,
    #[serde(serialize_with = "round_2")]
    pub growth_ratio: f64,
    pub source_breadth: usize,
    #[serde(serialize_with = "round_3")]
    pub recency_share: f64,
    #[serde(serialize_with = "round_3")]
    pub interest_score: f64,
    pub links: Vec<Link>,
}

/// Which tier of the significance fallback produced a pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackTier {
    Significant,
    Slope,
    Count,
}

impl FallbackTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Significant => "significant",
            Self::Slope => "slope",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for FallbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records selected by the tiered fallback, tagged with the tier used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierPick {
    pub tier: FallbackTier,
    pub records: Vec<TrendRecord>,
}

/// Round to a fixed number of decimals for presentation
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn round_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

fn round_3<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 3))
}
