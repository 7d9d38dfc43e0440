//! Analytics pipeline: phrases, windows, trends, scoring and ranking
//!
//! Data flows strictly forward:
//! documents -> [`phrases`] -> [`window`] -> [`keyword_trends`] /
//! [`regression`] -> [`scoring`] -> [`ranking`]. [`terms`] replaces the
//! phrase stage for closed-vocabulary reports.

pub mod keyword_trends;
pub mod phrases;
pub mod ranking;
pub mod regression;
pub mod scoring;
pub mod terms;
pub mod window;

pub use keyword_trends::{new_cutoff, KeywordTrend, TrendAnalyzer, TrendDirection};
pub use phrases::{
    AllowFilter, BanFilter, DocumentFrequencyFilter, PhraseExtractor, PhraseFilters, SynonymTable,
};
pub use ranking::{pick_tiered, rank_composite, GenericTermFilter};
pub use regression::{LinearFit, TrendError, TrendEstimator};
pub use scoring::{CompositeScorer, ScoreWeights};
pub use terms::{TermCounter, TokenizedDocument};
pub use window::{BucketClock, RollingWindows, WindowAggregator, WindowStats};
