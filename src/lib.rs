//! trendline - Trend-signal engine for multi-source document tables
//!
//! Turns timestamped documents collected from news, video, forum and social
//! sources into ranked lists of rising, falling and newly emerging phrases.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration, filters and term lists
//! - [`ingest`] - Document table loading and timestamp parsing
//! - [`text`] - Normalization, tokenization and stopwords
//! - [`analytics`] - Phrase extraction, bucketing, trend fitting, scoring
//! - [`engine`] - Report orchestration
//! - [`output`] - CSV and JSON report artifacts
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use trendline::config::Config;
//! use trendline::engine::SignalEngine;
//! use trendline::ingest::load_tables;
//! use trendline::output::ReportWriter;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let table = load_tables(&["data/all_docs.csv".into()]);
//!     let writer = ReportWriter::new(&config.report.output_dir, &config.report.prefix);
//!     let engine = SignalEngine::from_config(config)?;
//!     writer.write_signals(&engine.signals(&table.documents))?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod output;
pub mod text;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, FilterConfig, PhraseFilters};
    pub use crate::engine::{DiscoveryReport, SignalEngine, SignalsReport, TermsReport};
    pub use crate::error::{Error, ErrorCategory, Result, TrendlineErrorTrait};
    pub use crate::ingest::{load_tables, DocumentTable};
    pub use crate::models::{Document, FallbackTier, SignalRecord, SourceKind, TrendRecord};
    pub use crate::output::ReportWriter;
}

// Direct re-exports for convenience
pub use models::{Document, SignalRecord, TrendRecord};
