//! Output selection: tiered significance fallback and composite ranking
//!
//! Closed-vocabulary reports pick records through three tiers
//! (`significant` -> `slope` -> `count`) so a report is never empty while
//! any term exists. Open-vocabulary reports rank by composite score, with
//! the direction only choosing the candidate set.

use super::keyword_trends::TrendDirection;
use crate::models::{FallbackTier, PeriodBucket, SignalRecord, TierPick, TrendRecord};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

fn by_slope(direction: TrendDirection) -> impl Fn(&&TrendRecord, &&TrendRecord) -> Ordering {
    move |a, b| {
        let primary = match direction {
            TrendDirection::Falling => a.slope.total_cmp(&b.slope),
            _ => b.slope.total_cmp(&a.slope),
        };
        primary
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.phrase.cmp(&b.phrase))
    }
}

fn take_sorted<'a, F>(mut candidates: Vec<&'a TrendRecord>, cmp: F, k: usize) -> Vec<TrendRecord>
where
    F: Fn(&&'a TrendRecord, &&'a TrendRecord) -> Ordering,
{
    candidates.sort_by(cmp);
    candidates.into_iter().take(k).cloned().collect()
}

/// Pick up to `k` records for a direction under the three-tier fallback
///
/// `direction` is [`TrendDirection::Rising`] or [`TrendDirection::Falling`];
/// any other direction is treated as rising.
#[must_use]
pub fn pick_tiered(
    records: &[TrendRecord],
    direction: TrendDirection,
    k: usize,
    significance: f64,
) -> TierPick {
    let falling = direction == TrendDirection::Falling;
    let matches_sign = |r: &TrendRecord| if falling { r.slope < 0.0 } else { r.slope > 0.0 };

    let significant: Vec<&TrendRecord> = records
        .iter()
        .filter(|r| r.p_value < significance && matches_sign(r))
        .collect();
    if !significant.is_empty() {
        return TierPick {
            tier: FallbackTier::Significant,
            records: take_sorted(significant, by_slope(direction), k),
        };
    }

    let signed: Vec<&TrendRecord> = records.iter().filter(|r| matches_sign(r)).collect();
    if !signed.is_empty() {
        return TierPick {
            tier: FallbackTier::Slope,
            records: take_sorted(signed, by_slope(direction), k),
        };
    }

    let all: Vec<&TrendRecord> = records.iter().collect();
    let by_volume = move |a: &&TrendRecord, b: &&TrendRecord| {
        let primary = if falling {
            a.total.cmp(&b.total)
        } else {
            b.total.cmp(&a.total)
        };
        primary.then_with(|| a.phrase.cmp(&b.phrase))
    };
    TierPick {
        tier: FallbackTier::Count,
        records: take_sorted(all, by_volume, k),
    }
}

/// Overly broad single-token phrases removed before ranking
#[derive(Debug, Clone, Default)]
pub struct GenericTermFilter {
    terms: HashSet<String>,
}

impl GenericTermFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Only single-token phrases can be generic
    #[must_use]
    pub fn excludes(&self, phrase: &str) -> bool {
        !phrase.contains(' ') && self.terms.contains(phrase)
    }
}

/// Sort by composite score descending, then phrase, and keep the first
/// record per phrase
pub fn sort_by_score(signals: &mut Vec<SignalRecord>) {
    signals.sort_by(|a, b| {
        b.interest_score
            .total_cmp(&a.interest_score)
            .then_with(|| a.phrase.cmp(&b.phrase))
    });
    let mut seen = HashSet::new();
    signals.retain(|s| seen.insert(s.phrase.clone()));
}

/// Top `k` signals by composite score among the direction's candidates
///
/// Phrases without a trend record are only admitted by
/// [`TrendDirection::All`].
#[must_use]
pub fn rank_composite(
    signals: &[SignalRecord],
    records: &BTreeMap<String, TrendRecord>,
    direction: TrendDirection,
    new_cutoff: Option<PeriodBucket>,
    generic: &GenericTermFilter,
    k: usize,
) -> Vec<SignalRecord> {
    let mut ranked: Vec<SignalRecord> = signals
        .iter()
        .filter(|s| !generic.excludes(&s.phrase))
        .filter(|s| match records.get(&s.phrase) {
            Some(record) => direction.admits(record, new_cutoff),
            None => direction == TrendDirection::All,
        })
        .cloned()
        .collect();
    sort_by_score(&mut ranked);
    ranked.truncate(k);
    ranked
}
