//! Error scenario integration tests
//!
//! Tests failure modes and graceful degradation:
//! 1. Missing configuration, filters and terms files
//! 2. Invalid patterns
//! 3. Missing, empty and malformed document tables
//! 4. Empty input still writes every artifact

use std::fs;
use tempfile::TempDir;
use trendline::config::{load_terms, Config, FilterConfig};
use trendline::engine::SignalEngine;
use trendline::error::{Error, ErrorCategory, TrendlineErrorTrait};
use trendline::ingest::load_tables;
use trendline::output::ReportWriter;

use super::fixtures::{DOCUMENTS_JSONL, FILTERS_TOML, MALFORMED_CSV, TERMS_TXT};
use crate::common::test_config;

// ============================================================================
// Fatal Configuration Errors
// ============================================================================

#[test]
fn test_missing_filters_file_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.filters_path = Some(temp_dir.path().join("missing_filters.json"));

    let err = SignalEngine::from_config(config).unwrap_err();
    assert!(matches!(err, Error::MissingConfig { .. }));
    assert_eq!(err.category(), ErrorCategory::Config);
    assert!(!err.is_recoverable());
}

#[test]
fn test_missing_terms_file_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let err = load_terms(&temp_dir.path().join("terms.txt")).unwrap_err();
    assert!(matches!(err, Error::MissingConfig { .. }));
}

#[test]
fn test_missing_config_file_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::from_file(&temp_dir.path().join("trendline.toml")).unwrap_err();
    assert!(matches!(err, Error::MissingConfig { .. }));
}

#[test]
fn test_invalid_ban_pattern_is_fatal() {
    let filters = FilterConfig {
        ban_regex: vec!["(unclosed".to_string()],
        ..FilterConfig::default()
    };
    let err = filters.compile().unwrap_err();
    assert!(matches!(err, Error::InvalidPattern { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn test_toml_filters_and_text_terms() {
    let temp_dir = TempDir::new().unwrap();
    let filters_path = temp_dir.path().join("filters.toml");
    fs::write(&filters_path, FILTERS_TOML).unwrap();
    let terms_path = temp_dir.path().join("terms.txt");
    fs::write(&terms_path, TERMS_TXT).unwrap();

    let filters = FilterConfig::from_file(&filters_path).unwrap();
    assert_eq!(filters.banlist, vec!["promo code", "giveaway"]);
    let compiled = filters.compile().unwrap();
    assert!(compiled.ban.is_banned("sponsored post"));
    assert_eq!(compiled.synonyms.canonicalize("air-fryer recipes"), "air fryer recipes");

    assert_eq!(
        load_terms(&terms_path).unwrap(),
        vec!["air fryer recipes", "holiday lights"]
    );
}

// ============================================================================
// Input Degradation
// ============================================================================

#[test]
fn test_malformed_rows_dropped_and_counted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reddit.csv");
    fs::write(&path, MALFORMED_CSV).unwrap();

    let table = load_tables(&[path]);
    assert_eq!(table.stats.rows_read, 4);
    assert_eq!(table.stats.dropped_rows, 2);
    assert_eq!(table.stats.kept_rows(), 2);
    assert_eq!(table.documents.len(), 2);
    assert_eq!(table.documents[0].category, "cooking");
    assert_eq!(table.documents[1].category, "mixed");
    assert!(table.documents[1].url.is_none());
}

#[test]
fn test_missing_tables_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let jsonl = temp_dir.path().join("news.jsonl");
    fs::write(&jsonl, DOCUMENTS_JSONL).unwrap();

    let table = load_tables(&[temp_dir.path().join("absent.csv"), jsonl]);
    assert_eq!(table.stats.tables_skipped, 1);
    assert_eq!(table.stats.tables_read, 1);
    assert_eq!(table.documents.len(), 2);
    assert_eq!(table.documents[0].category, "lighting");
    assert_eq!(table.documents[0].body, "Holiday lights sale");
    assert_eq!(table.documents[1].category, "example.com");
}

#[test]
fn test_unreadable_table_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();

    let table = load_tables(&[broken]);
    assert_eq!(table.stats.tables_skipped, 1);
    assert!(table.documents.is_empty());
}

#[test]
fn test_empty_input_writes_every_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path());
    let writer = ReportWriter::new(&config.report.output_dir, &config.report.prefix);
    let engine = SignalEngine::from_config(config).unwrap();

    let table = load_tables(&[temp_dir.path().join("nothing.csv")]);
    assert!(table.documents.is_empty());

    let mut written = writer.write_signals(&engine.signals(&table.documents)).unwrap();
    written.extend(writer.write_discovery(&engine.discover(&table.documents)).unwrap());
    let terms = vec!["holiday lights".to_string()];
    written.extend(writer.write_terms(&engine.terms(&table.documents, &terms)).unwrap());
    assert_eq!(written.len(), 13);

    for path in &written {
        assert!(path.exists(), "{} missing", path.display());
        let content = fs::read_to_string(path).unwrap();
        if path.extension().is_some_and(|e| e == "csv") {
            assert_eq!(content.lines().count(), 1, "{} not header-only", path.display());
        } else {
            let value: serde_json::Value = serde_json::from_str(&content).unwrap();
            assert!(value["signals"].as_array().unwrap().is_empty());
        }
    }
}
