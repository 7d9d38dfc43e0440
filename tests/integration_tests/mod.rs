//! Integration tests module
//!
//! End-to-end tests for the trendline engine, including:
//! - Document table -> report artifact pipeline
//! - Tiered fallback and composite ranking on synthetic corpora
//! - Error handling and empty-input scenarios

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
