//! Keyword trend tracking over bucketed time series
//!
//! This module provides functionality for:
//! - Tracking per-phrase mention counts by bucket
//! - Expanding sparse counts into dense series over a shared horizon
//! - Estimating slope and significance for every phrase in parallel
//! - Selecting candidate sets by trend direction

use super::regression::TrendEstimator;
use crate::models::{PeriodBucket, TrendRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Direction a report is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Positive slope
    Rising,

    /// Negative slope
    Falling,

    /// First seen within the recent lookback and positive slope
    Emerging,

    /// No selection
    All,
}

impl TrendDirection {
    /// Whether a record belongs to the candidate set for this direction
    ///
    /// # Arguments
    /// * `record` - Fitted trend record
    /// * `new_cutoff` - Earliest first-seen bucket that still counts as new
    #[must_use]
    pub fn admits(&self, record: &TrendRecord, new_cutoff: Option<PeriodBucket>) -> bool {
        match self {
            Self::Rising => record.slope > 0.0,
            Self::Falling => record.slope < 0.0,
            Self::Emerging => {
                record.slope > 0.0
                    && match (record.first_seen, new_cutoff) {
                        (Some(first), Some(cutoff)) => first >= cutoff,
                        _ => false,
                    }
            }
            Self::All => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Emerging => "emerging",
            Self::All => "all",
        }
    }
}

/// Earliest bucket that still counts as "new"
///
/// With more than `lookback` buckets this is the `lookback`-th bucket from
/// the end; otherwise the first bucket.
#[must_use]
pub fn new_cutoff(horizon: &[PeriodBucket], lookback: usize) -> Option<PeriodBucket> {
    if horizon.len() > lookback && lookback > 0 {
        Some(horizon[horizon.len() - lookback])
    } else {
        horizon.first().copied()
    }
}

/// Bucketed counts for one phrase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTrend {
    /// Phrase being tracked
    pub keyword: String,

    /// Sparse bucket -> count map
    data: BTreeMap<PeriodBucket, u64>,
}

impl KeywordTrend {
    /// Create a new keyword trend tracker
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            data: BTreeMap::new(),
        }
    }

    /// Add mentions to a bucket
    pub fn add_point(&mut self, bucket: PeriodBucket, count: u64) {
        *self.data.entry(bucket).or_insert(0) += count;
    }

    /// Add multiple data points at once
    pub fn add_points<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (PeriodBucket, u64)>,
    {
        for (bucket, count) in points {
            self.add_point(bucket, count);
        }
    }

    /// One entry per horizon bucket, zero where nothing was recorded
    #[must_use]
    pub fn dense_series(&self, horizon: &[PeriodBucket]) -> Vec<(PeriodBucket, u64)> {
        horizon
            .iter()
            .map(|bucket| (*bucket, self.data.get(bucket).copied().unwrap_or(0)))
            .collect()
    }

    /// Dense record with fitted slope and p-value
    #[must_use]
    pub fn to_record(&self, horizon: &[PeriodBucket], estimator: &TrendEstimator) -> TrendRecord {
        let mut record = TrendRecord::from_series(self.keyword.clone(), self.dense_series(horizon));
        let (slope, p_value) = estimator.estimate(&record.series);
        record.slope = slope;
        record.p_value = p_value;
        record
    }
}

/// Collection of keyword trends sharing one horizon
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    /// Map of phrase to its trend data
    trends: BTreeMap<String, KeywordTrend>,

    estimator: TrendEstimator,
}

impl TrendAnalyzer {
    /// Build from phrase -> bucket -> count maps
    ///
    /// A phrase with an empty bucket map is still tracked and fits to a flat
    /// zero series.
    #[must_use]
    pub fn from_counts(
        counts: BTreeMap<String, BTreeMap<PeriodBucket, u64>>,
        estimator: TrendEstimator,
    ) -> Self {
        let trends = counts
            .into_iter()
            .map(|(phrase, buckets)| {
                let mut trend = KeywordTrend::new(phrase.clone());
                trend.add_points(buckets);
                (phrase, trend)
            })
            .collect();
        Self { trends, estimator }
    }

    /// Fit every tracked phrase over the horizon, in phrase order
    #[must_use]
    pub fn records(&self, horizon: &[PeriodBucket]) -> Vec<TrendRecord> {
        let trends: Vec<&KeywordTrend> = self.trends.values().collect();
        let records: Vec<TrendRecord> = trends
            .par_iter()
            .map(|trend| trend.to_record(horizon, &self.estimator))
            .collect();

        tracing::debug!(
            phrases = records.len(),
            buckets = horizon.len(),
            fitted = records.iter().filter(|r| r.p_value < 1.0).count(),
            "Estimated trends"
        );
        records
    }
}
