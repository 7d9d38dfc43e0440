//! Composite interest scoring
//!
//! Four rolling-window metrics are standardized across the whole phrase
//! population and combined with fixed weights:
//!
//! ```text
//! score = w_vol * z(volume_short) + w_growth * z(growth)
//!       + w_breadth * z(breadth) + w_recency * z(recency) + allow_boost
//! ```

use super::window::WindowStats;
use crate::config::ScoringConfig;
use crate::models::SignalRecord;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Standard scores using the sample standard deviation
///
/// Fewer than two values, or no spread, gives zero for every member.
///
/// # Examples
///
/// ```
/// use trendline::analytics::scoring::zscores;
///
/// assert_eq!(zscores(&[2.0, 2.0, 2.0]), vec![0.0, 0.0, 0.0]);
/// let z = zscores(&[1.0, 2.0, 3.0]);
/// assert!((z[0] + 1.0).abs() < 1e-12 && (z[2] - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn zscores(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return vec![0.0; values.len()];
    }
    let mean = values.iter().mean();
    let sd = values.iter().std_dev();
    if !sd.is_finite() || sd == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / sd).collect()
}

/// Short-window count relative to the long window's per-short-window average
///
/// With 7/28-day windows this is `short / (long / 4)`. Zero when the long
/// window is empty.
#[must_use]
pub fn growth_ratio(short: u64, long: u64, short_days: u32, long_days: u32) -> f64 {
    if long == 0 || short_days == 0 {
        return 0.0;
    }
    let periods = f64::from(long_days) / f64::from(short_days);
    let baseline = long as f64 / periods;
    if baseline == 0.0 {
        0.0
    } else {
        short as f64 / baseline
    }
}

/// Share of long-window mentions that fall in the short window
#[must_use]
pub fn recency_share(short: u64, long: u64) -> f64 {
    if long == 0 {
        0.0
    } else {
        short as f64 / long as f64
    }
}

/// Weights of the composite score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub volume: f64,
    pub growth: f64,
    pub breadth: f64,
    pub recency: f64,
    pub allow_boost: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            volume: 1.0,
            growth: 1.5,
            breadth: 0.5,
            recency: 0.5,
            allow_boost: 0.4,
        }
    }
}

impl From<&ScoringConfig> for ScoreWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            volume: config.weight_volume,
            growth: config.weight_growth,
            breadth: config.weight_breadth,
            recency: config.weight_recency,
            allow_boost: config.allow_boost,
        }
    }
}

/// Turns window statistics into scored signal records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScorer {
    weights: ScoreWeights,
    short_days: u32,
    long_days: u32,
}

impl CompositeScorer {
    pub fn new(weights: ScoreWeights, short_days: u32, long_days: u32) -> Self {
        Self {
            weights,
            short_days,
            long_days,
        }
    }

    /// Score every phrase in `stats`; the map is the z-score population
    ///
    /// Records come back in phrase order, unranked.
    pub fn score(&self, stats: &BTreeMap<String, WindowStats>) -> Vec<SignalRecord> {
        let growth: Vec<f64> = stats
            .values()
            .map(|s| growth_ratio(s.volume_short, s.volume_long, self.short_days, self.long_days))
            .collect();
        let recency: Vec<f64> = stats
            .values()
            .map(|s| recency_share(s.volume_short, s.volume_long))
            .collect();
        let volume: Vec<f64> = stats.values().map(|s| s.volume_short as f64).collect();
        let breadth: Vec<f64> = stats.values().map(|s| s.source_breadth as f64).collect();

        let z_volume = zscores(&volume);
        let z_growth = zscores(&growth);
        let z_breadth = zscores(&breadth);
        let z_recency = zscores(&recency);

        let w = self.weights;
        stats
            .iter()
            .enumerate()
            .map(|(i, (phrase, s))| {
                let boost = if s.allowed { w.allow_boost } else { 0.0 };
                let interest_score = w.volume * z_volume[i]
                    + w.growth * z_growth[i]
                    + w.breadth * z_breadth[i]
                    + w.recency * z_recency[i]
                    + boost;
                SignalRecord {
                    phrase: phrase.clone(),
                    category: s.category.clone(),
                    volume_short: s.volume_short,
                    volume_long: s.volume_long,
                    growth_ratio: growth[i],
                    source_breadth: s.source_breadth,
                    recency_share: recency[i],
                    interest_score,
                    links: s.links.clone(),
                }
            })
            .collect()
    }
}
