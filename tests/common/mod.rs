//! Common test utilities

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use trendline::config::Config;
use trendline::models::{Document, SourceKind};

const SOURCES: [&str; 3] = ["rss", "reddit", "youtube"];

/// Monday 2024-01-01 00:00 UTC
pub fn week_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Document `slot` hours into week `week`
pub fn create_document(week: i64, slot: i64, title: &str) -> Document {
    Document {
        source: SourceKind::parse(SOURCES[slot.rem_euclid(3) as usize]),
        category: "home".to_string(),
        timestamp: week_start() + Duration::weeks(week) + Duration::hours(slot + 1),
        title: title.to_string(),
        body: String::new(),
        url: Some(format!("https://example.com/w{week}/{slot}")),
    }
}

/// One document per mention: `(title, [count per week])`
pub fn weekly_corpus(rows: &[(&str, [usize; 4])]) -> Vec<Document> {
    let mut docs = Vec::new();
    for (title, counts) in rows {
        for (week, n) in counts.iter().enumerate() {
            for _ in 0..*n {
                let slot = docs.len() as i64;
                docs.push(create_document(week as i64, slot % 120, title));
            }
        }
    }
    docs
}

/// 30 documents over four weekly buckets
///
/// "air fryer recipes" appears in 1, 2, 5, 9 documents per week and
/// "holiday lights" in 9, 5, 2, 1.
pub fn trend_corpus() -> Vec<Document> {
    const BOTH: &str = "Air fryer recipes versus holiday lights";
    const AIR: &str = "Quick air fryer recipes tonight";
    const LIGHTS: &str = "Holiday lights display downtown";

    // (both, air only, lights only, filler) per week
    let weeks: [(usize, usize, usize, usize); 4] = [(1, 0, 8, 0), (2, 0, 3, 1), (2, 3, 0, 1), (1, 8, 0, 0)];
    let mut docs = Vec::new();
    for (week, (both, air, lights, filler)) in weeks.iter().enumerate() {
        let titles = std::iter::repeat(BOTH)
            .take(*both)
            .chain(std::iter::repeat(AIR).take(*air))
            .chain(std::iter::repeat(LIGHTS).take(*lights))
            .chain(std::iter::repeat("Weekend brunch plans").take(*filler));
        for (slot, title) in titles.enumerate() {
            docs.push(create_document(week as i64, slot as i64, title));
        }
    }
    docs
}

/// Defaults with the rolling windows ending on 2024-01-29
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.windows.as_of = Some(week_start() + Duration::weeks(4));
    config.report.output_dir = output_dir.to_path_buf();
    config.report.prefix = "test".to_string();
    config
}

/// Write documents as a CSV table with epoch-second timestamps
pub fn write_document_table(dir: &Path, name: &str, docs: &[Document]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer
        .write_record(["source", "category", "timestamp", "title", "body", "url"])
        .unwrap();
    for doc in docs {
        writer
            .write_record([
                doc.source.as_str().to_string(),
                doc.category.clone(),
                doc.timestamp.timestamp().to_string(),
                doc.title.clone(),
                doc.body.clone(),
                doc.url.clone().unwrap_or_default(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}
