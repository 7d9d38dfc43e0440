//! End-to-end pipeline integration tests
//!
//! Tests the complete workflow:
//! 1. Document table loading
//! 2. Phrase extraction and bucketing
//! 3. Trend fitting and ranking
//! 4. Report artifacts

use std::fs;
use tempfile::TempDir;
use trendline::analytics::phrases::{BanFilter, PhraseFilters};
use trendline::config::{load_terms, FilterConfig};
use trendline::engine::SignalEngine;
use trendline::ingest::load_tables;
use trendline::models::FallbackTier;
use trendline::output::ReportWriter;

use super::fixtures::{FILTERS_JSON, TERMS_JSON};
use crate::common::{test_config, trend_corpus, weekly_corpus, write_document_table};

// ============================================================================
// Closed Vocabulary
// ============================================================================

#[test]
fn test_terms_pipeline_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let table = write_document_table(temp_dir.path(), "docs.csv", &trend_corpus());
    let terms_path = temp_dir.path().join("terms.json");
    fs::write(&terms_path, TERMS_JSON).unwrap();

    let loaded = load_tables(&[table]);
    assert_eq!(loaded.documents.len(), 30);
    assert_eq!(loaded.stats.dropped_rows, 0);

    let terms = load_terms(&terms_path).unwrap();
    assert_eq!(terms, vec!["air fryer recipes", "holiday lights"]);

    let config = test_config(temp_dir.path());
    let engine = SignalEngine::new(config, PhraseFilters::default()).unwrap();
    let report = engine.terms(&loaded.documents, &terms);

    assert_eq!(report.increasing.tier, FallbackTier::Significant);
    assert_eq!(report.increasing.records[0].phrase, "air fryer recipes");
    assert_eq!(report.decreasing.tier, FallbackTier::Significant);
    assert_eq!(report.decreasing.records[0].phrase, "holiday lights");

    let air = report.records.iter().find(|r| r.phrase == "air fryer recipes").unwrap();
    let counts: Vec<u64> = air.series.iter().map(|(_, c)| *c).collect();
    assert_eq!(counts, vec![1, 2, 5, 9]);
    assert!(air.slope > 0.0);
    assert!((air.p_value - 0.0302).abs() < 0.002, "p = {}", air.p_value);

    let lights = report.records.iter().find(|r| r.phrase == "holiday lights").unwrap();
    let counts: Vec<u64> = lights.series.iter().map(|(_, c)| *c).collect();
    assert_eq!(counts, vec![9, 5, 2, 1]);
    assert!(lights.slope < 0.0);

    let writer = ReportWriter::new(temp_dir.path().join("out"), "test");
    let written = writer.write_terms(&report).unwrap();
    assert_eq!(written.len(), 6);

    let increasing = fs::read_to_string(writer.artifact_path("increasing_terms.csv")).unwrap();
    let mut lines = increasing.lines();
    assert_eq!(
        lines.next(),
        Some("tier,phrase,total,slope,p_value,nonzero_buckets,first_seen,last_seen")
    );
    assert!(lines.next().unwrap().starts_with("significant,air fryer recipes,17,"));

    let over_time = fs::read_to_string(writer.artifact_path("term_counts_over_time.csv")).unwrap();
    assert!(over_time.contains("air fryer recipes,2024-01-01,1"));
    assert!(over_time.contains("holiday lights,2024-01-22,1"));
}

#[test]
fn test_terms_slope_tier() {
    let docs = weekly_corpus(&[("slow climber", [2, 1, 3, 3]), ("noise", [1, 0, 0, 0])]);
    let temp_dir = TempDir::new().unwrap();
    let engine = SignalEngine::new(test_config(temp_dir.path()), PhraseFilters::default()).unwrap();
    let report = engine.terms(&docs, &["slow climber".to_string(), "noise".to_string()]);

    assert_eq!(report.increasing.tier, FallbackTier::Slope);
    assert_eq!(report.increasing.records.len(), 1);
    assert_eq!(report.increasing.records[0].phrase, "slow climber");

    // one nonzero bucket: no trend evidence
    let noise = report.records.iter().find(|r| r.phrase == "noise").unwrap();
    assert_eq!(noise.slope, 0.0);
    assert_eq!(noise.p_value, 1.0);
}

#[test]
fn test_terms_count_tier() {
    let docs = weekly_corpus(&[("big lamp", [3, 3, 3, 3]), ("small lamp", [1, 1, 1, 1])]);
    let temp_dir = TempDir::new().unwrap();
    let engine = SignalEngine::new(test_config(temp_dir.path()), PhraseFilters::default()).unwrap();
    let terms = vec!["small lamp".to_string(), "big lamp".to_string()];
    let report = engine.terms(&docs, &terms);

    assert_eq!(report.increasing.tier, FallbackTier::Count);
    assert_eq!(report.increasing.records[0].phrase, "big lamp");
    assert_eq!(report.decreasing.tier, FallbackTier::Count);
    assert_eq!(report.decreasing.records[0].phrase, "small lamp");
}

#[test]
fn test_banned_terms_never_get_records() {
    let temp_dir = TempDir::new().unwrap();
    let filters = PhraseFilters {
        ban: BanFilter::new(&["promo code".to_string(), "giveaway".to_string()], &[], &[]).unwrap(),
        ..PhraseFilters::default()
    };
    let engine = SignalEngine::new(test_config(temp_dir.path()), filters).unwrap();
    let docs = weekly_corpus(&[
        ("promo code", [1, 2, 5, 9]),
        ("lamp giveaway", [1, 2, 5, 9]),
        ("brass lamp", [1, 1, 2, 2]),
    ]);
    let terms = vec![
        "Promo Code".to_string(),
        "lamp giveaway".to_string(),
        "brass lamp".to_string(),
    ];
    let report = engine.terms(&docs, &terms);

    let phrases: Vec<&str> = report.records.iter().map(|r| r.phrase.as_str()).collect();
    assert_eq!(phrases, vec!["brass lamp"]);
    assert!(report
        .increasing
        .records
        .iter()
        .chain(&report.decreasing.records)
        .all(|r| r.phrase == "brass lamp"));
}

#[test]
fn test_synonym_terms_share_one_record() {
    let temp_dir = TempDir::new().unwrap();
    let filters = FilterConfig {
        synonyms: [("air fryer".to_string(), vec!["airfryer".to_string()])]
            .into_iter()
            .collect(),
        ..FilterConfig::default()
    }
    .compile()
    .unwrap();
    let engine = SignalEngine::new(test_config(temp_dir.path()), filters).unwrap();
    let docs = weekly_corpus(&[("air fryer", [1, 1, 1, 1]), ("airfryer", [1, 1, 1, 1])]);
    let report = engine.terms(&docs, &["air fryer".to_string(), "airfryer".to_string()]);

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].phrase, "air fryer");
    assert_eq!(report.records[0].total, 8);
}

#[test]
fn test_top_words_report() {
    let temp_dir = TempDir::new().unwrap();
    let engine = SignalEngine::new(test_config(temp_dir.path()), PhraseFilters::default()).unwrap();
    let report = engine.terms(&trend_corpus(), &[]);

    assert!(report.records.is_empty());
    let words: Vec<&str> = report.top_words.iter().map(|(w, _)| w.as_str()).collect();
    assert!(words.contains(&"recipes"));
    assert!(!words.contains(&"the"));
    assert_eq!(report.top_bigrams[0].1, 17);
}

// ============================================================================
// Open Vocabulary
// ============================================================================

#[test]
fn test_discover_pipeline_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let engine = SignalEngine::new(test_config(temp_dir.path()), PhraseFilters::default()).unwrap();
    let report = engine.discover(&trend_corpus());

    let air = report.record("air fryer recipes").unwrap();
    assert_eq!(air.total, 17);
    assert!(air.slope > 0.0);
    assert!(air.p_value < 0.05);
    // two documents fall below the minimum document frequency
    assert!(report.record("weekend brunch").is_none());

    assert!(report.increasing.iter().any(|s| s.phrase == "air fryer recipes"));
    assert!(!report.increasing.iter().any(|s| s.phrase == "holiday lights"));
    assert!(report.decreasing.iter().any(|s| s.phrase == "holiday lights"));

    for list in [&report.increasing, &report.decreasing, &report.emerging] {
        assert!(list
            .windows(2)
            .all(|w| w[0].interest_score >= w[1].interest_score));
    }

    let writer = ReportWriter::new(temp_dir.path(), "test");
    let written = writer.write_discovery(&report).unwrap();
    assert_eq!(written.len(), 6);
    for name in [
        "test_top_phrases.csv",
        "test_phrase_counts_over_time.csv",
        "test_increasing_terms.csv",
        "test_decreasing_terms.csv",
        "test_new_terms.csv",
        "test_signals.json",
    ] {
        assert!(temp_dir.path().join(name).exists(), "{name} missing");
    }

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("test_signals.json")).unwrap())
            .unwrap();
    assert_eq!(value["horizon_days"], 28);
    assert!(!value["signals"].as_array().unwrap().is_empty());
}

#[test]
fn test_dense_series_across_horizon() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.phrases.min_document_frequency = 1;
    config.phrases.max_document_frequency = 1.0;
    let engine = SignalEngine::new(config, PhraseFilters::default()).unwrap();

    let docs = weekly_corpus(&[("gap year", [2, 0, 0, 1]), ("steady glow", [1, 1, 1, 1])]);
    let report = engine.discover(&docs);

    let gap = report.record("gap year").unwrap();
    assert_eq!(gap.series.len(), 4);
    let counts: Vec<u64> = gap.series.iter().map(|(_, c)| *c).collect();
    assert_eq!(counts, vec![2, 0, 0, 1]);
    assert_eq!(gap.slope, 0.0);
    assert_eq!(gap.p_value, 1.0);
}

#[test]
fn test_signals_growth_beats_steady_volume() {
    let temp_dir = TempDir::new().unwrap();
    let engine = SignalEngine::new(test_config(temp_dir.path()), PhraseFilters::default()).unwrap();
    // same short-window volume, different long-window history
    let docs = weekly_corpus(&[("sudden spark", [0, 0, 0, 4]), ("steady glow", [4, 4, 4, 4])]);
    let report = engine.signals(&docs);

    let names: Vec<&str> = report.signals.iter().map(|s| s.phrase.as_str()).collect();
    assert_eq!(names, vec!["sudden spark", "steady glow"]);
    assert_eq!(report.signals[0].volume_short, 4);
    assert_eq!(report.signals[1].volume_short, 4);
    assert_eq!(report.signals[0].growth_ratio, 4.0);
    assert_eq!(report.signals[1].growth_ratio, 1.0);
}

#[test]
fn test_signals_never_contain_banned_phrases() {
    let temp_dir = TempDir::new().unwrap();
    let filters_path = temp_dir.path().join("filters.json");
    fs::write(&filters_path, FILTERS_JSON).unwrap();
    let filters = FilterConfig::from_file(&filters_path).unwrap().compile().unwrap();
    let ban = filters.ban.clone();

    let docs = weekly_corpus(&[
        ("promo code", [1, 1, 2, 2]),
        ("giveaway lamp deals", [1, 2, 2, 3]),
        ("sponsored desk tour", [2, 2, 2, 2]),
        ("acme corp", [1, 1, 1, 1]),
        ("airfryer recipes", [1, 1, 2, 3]),
    ]);
    let engine = SignalEngine::new(test_config(temp_dir.path()), filters).unwrap();
    let report = engine.signals(&docs);

    assert!(!report.signals.is_empty());
    for signal in &report.signals {
        assert!(!ban.is_banned(&signal.phrase), "{} is banned", signal.phrase);
        assert!(
            signal.phrase.split(' ').all(|t| !ban.is_banned_token(t)),
            "{} has a banned token",
            signal.phrase
        );
    }
    let phrases: Vec<&str> = report.signals.iter().map(|s| s.phrase.as_str()).collect();
    assert!(phrases.contains(&"air fryer recipes"));
    assert!(!phrases.contains(&"airfryer recipes"));
    assert!(phrases.iter().all(|p| !p.contains("sponsored")));
    assert!(phrases.contains(&"lamp deals"));
}

#[test]
fn test_generic_terms_excluded() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path());
    config.phrases.min_phrase_tokens = 1;
    config.phrases.ngram_min = 1;
    config.phrases.min_document_frequency = 1;
    config.phrases.max_document_frequency = 1.0;
    config.scoring.generic_terms = vec!["lamp".to_string()];
    let engine = SignalEngine::new(config, PhraseFilters::default()).unwrap();

    let docs = weekly_corpus(&[("lamp", [1, 2, 3, 4]), ("brass lamp", [1, 2, 3, 4])]);
    let report = engine.discover(&docs);
    assert!(report.increasing.iter().all(|s| s.phrase != "lamp"));
    assert!(report.increasing.iter().any(|s| s.phrase == "brass lamp"));
    assert!(report.increasing.iter().any(|s| s.phrase == "brass"));
}

#[test]
fn test_ban_filter_unit_behaviour() {
    let ban = BanFilter::new(&["promo code".to_string()], &[], &[]).unwrap();
    assert!(ban.is_banned("promo code"));
    assert!(!ban.is_banned("promo codes"));
}
