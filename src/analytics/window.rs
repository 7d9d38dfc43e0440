//! Time bucketing and rolling-window aggregation
//!
//! Mentions are floored onto Monday-aligned UTC buckets for the per-phrase
//! series, and separately counted in two rolling windows ending at a
//! reference instant. Rolling windows ignore bucket alignment.

use crate::models::{Link, Mention, PeriodBucket, SourceKind};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// 1970-01-05T00:00:00Z, the first Monday after the Unix epoch
const MONDAY_ANCHOR_SECS: i64 = 345_600;

/// Default category when a phrase has no mention in the long window
pub const MIXED_CATEGORY: &str = "mixed";

/// Floors instants onto fixed-width buckets aligned to Monday 00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketClock {
    width_secs: i64,
}

impl BucketClock {
    pub fn new(width: Duration) -> Self {
        Self {
            width_secs: width.num_seconds().max(1),
        }
    }

    /// One-week buckets
    pub fn weekly() -> Self {
        Self::new(Duration::days(7))
    }

    #[must_use]
    pub fn width(&self) -> Duration {
        Duration::seconds(self.width_secs)
    }

    /// Most recent bucket-aligned instant at or before `ts`
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use trendline::analytics::window::BucketClock;
    ///
    /// let clock = BucketClock::weekly();
    /// // Sunday evening belongs to the week starting the previous Monday
    /// let ts = Utc.with_ymd_and_hms(2024, 1, 14, 23, 59, 59).unwrap();
    /// assert_eq!(clock.floor(ts).date().to_string(), "2024-01-08");
    /// ```
    #[must_use]
    pub fn floor(&self, ts: DateTime<Utc>) -> PeriodBucket {
        let secs = ts.timestamp();
        let offset = (secs - MONDAY_ANCHOR_SECS).rem_euclid(self.width_secs);
        let start = ts
            - Duration::seconds(offset)
            - Duration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()));
        PeriodBucket::from_start(start)
    }

    /// Every bucket from the one holding `first` to the one holding `last`
    #[must_use]
    pub fn horizon(&self, first: DateTime<Utc>, last: DateTime<Utc>) -> Vec<PeriodBucket> {
        let end = self.floor(last);
        let mut current = self.floor(first);
        let mut buckets = Vec::new();
        while current <= end {
            buckets.push(current);
            current = PeriodBucket::from_start(current.start() + self.width());
        }
        buckets
    }

    /// Horizon spanning the earliest and latest of the given instants
    pub fn horizon_of<I>(&self, timestamps: I) -> Vec<PeriodBucket>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for ts in timestamps {
            bounds = Some(match bounds {
                None => (ts, ts),
                Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
            });
        }
        match bounds {
            Some((lo, hi)) => self.horizon(lo, hi),
            None => Vec::new(),
        }
    }
}

impl Default for BucketClock {
    fn default() -> Self {
        Self::weekly()
    }
}

/// Short and long rolling windows ending at `as_of` (both ends inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingWindows {
    pub as_of: DateTime<Utc>,
    pub short: Duration,
    pub long: Duration,
}

impl RollingWindows {
    pub fn new(as_of: DateTime<Utc>, short_days: u32, long_days: u32) -> Self {
        Self {
            as_of,
            short: Duration::days(i64::from(short_days)),
            long: Duration::days(i64::from(long_days)),
        }
    }

    #[must_use]
    pub fn in_short(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.as_of - self.short && ts <= self.as_of
    }

    #[must_use]
    pub fn in_long(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.as_of - self.long && ts <= self.as_of
    }
}

/// Rolling-window statistics for one phrase
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStats {
    pub volume_short: u64,
    pub volume_long: u64,
    /// Distinct source kinds in the long window
    pub source_breadth: usize,
    /// Dominant category in the long window
    pub category: String,
    /// Newest distinct links in the long window
    pub links: Vec<Link>,
    /// At least one mention passed the category allow-list
    pub allowed: bool,
}

#[derive(Default)]
struct StatsBuilder<'a> {
    volume_short: u64,
    volume_long: u64,
    sources: BTreeSet<&'a SourceKind>,
    categories: BTreeMap<&'a str, u64>,
    links: Vec<(DateTime<Utc>, &'a str)>,
    allowed: bool,
}

impl StatsBuilder<'_> {
    fn finish(mut self, max_links: usize) -> WindowStats {
        // max count wins; BTreeMap order makes the alphabetically first category win ties
        let mut category: &str = MIXED_CATEGORY;
        let mut best = 0;
        for (name, count) in &self.categories {
            if *count > best {
                best = *count;
                category = *name;
            }
        }

        self.links
            .sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        let mut seen = BTreeSet::new();
        let links = self
            .links
            .into_iter()
            .filter(|(_, url)| seen.insert(*url))
            .take(max_links)
            .map(|(timestamp, url)| Link {
                url: url.to_string(),
                timestamp,
            })
            .collect();

        WindowStats {
            volume_short: self.volume_short,
            volume_long: self.volume_long,
            source_breadth: self.sources.len(),
            category: category.to_string(),
            links,
            allowed: self.allowed,
        }
    }
}

/// Counts mentions per bucket and per rolling window
#[derive(Debug, Clone, Copy)]
pub struct WindowAggregator {
    clock: BucketClock,
    windows: RollingWindows,
    max_links: usize,
}

impl WindowAggregator {
    pub fn new(clock: BucketClock, windows: RollingWindows, max_links: usize) -> Self {
        Self {
            clock,
            windows,
            max_links,
        }
    }

    #[must_use]
    pub fn clock(&self) -> BucketClock {
        self.clock
    }

    #[must_use]
    pub fn windows(&self) -> RollingWindows {
        self.windows
    }

    /// phrase -> bucket -> mention count (sparse; see
    /// [`crate::analytics::keyword_trends::KeywordTrend::dense_series`])
    pub fn aggregate(&self, mentions: &[Mention]) -> BTreeMap<String, BTreeMap<PeriodBucket, u64>> {
        let mut counts: BTreeMap<String, BTreeMap<PeriodBucket, u64>> = BTreeMap::new();
        for mention in mentions {
            let bucket = self.clock.floor(mention.timestamp);
            *counts
                .entry(mention.phrase.clone())
                .or_default()
                .entry(bucket)
                .or_insert(0) += 1;
        }
        counts
    }

    /// Rolling-window statistics for every phrase that has any mention
    pub fn window_stats(&self, mentions: &[Mention]) -> BTreeMap<String, WindowStats> {
        let mut builders: BTreeMap<&str, StatsBuilder<'_>> = BTreeMap::new();
        for mention in mentions {
            let builder = builders.entry(mention.phrase.as_str()).or_default();
            builder.allowed |= mention.allowed;
            if !self.windows.in_long(mention.timestamp) {
                continue;
            }
            builder.volume_long += 1;
            if self.windows.in_short(mention.timestamp) {
                builder.volume_short += 1;
            }
            builder.sources.insert(&mention.source);
            *builder.categories.entry(mention.category.as_str()).or_insert(0) += 1;
            if let Some(url) = mention.url.as_deref().filter(|u| !u.is_empty()) {
                builder.links.push((mention.timestamp, url));
            }
        }

        builders
            .into_iter()
            .map(|(phrase, builder)| (phrase.to_string(), builder.finish(self.max_links)))
            .collect()
    }
}
