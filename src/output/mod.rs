//! Report artifacts
//!
//! Every declared artifact is written on every run, header-only when there
//! is nothing to report, so downstream consumers never see a missing file.
//! Files are written to a temporary path and renamed into place.

use crate::engine::{DiscoveryReport, SignalsReport, TermsReport};
use crate::error::{Error, Result};
use crate::models::{round_to, SignalRecord, TierPick, TrendRecord};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const TREND_HEADER: [&str; 7] = [
    "phrase",
    "total",
    "slope",
    "p_value",
    "nonzero_buckets",
    "first_seen",
    "last_seen",
];

const SIGNAL_HEADER: [&str; 9] = [
    "phrase",
    "category",
    "volume_short",
    "volume_long",
    "growth_ratio",
    "source_breadth",
    "recency_share",
    "interest_score",
    "links",
];

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn trend_row(record: &TrendRecord) -> Vec<String> {
    vec![
        record.phrase.clone(),
        record.total.to_string(),
        format!("{:.6}", record.slope),
        format!("{:.6}", record.p_value),
        record.nonzero_buckets.to_string(),
        optional(record.first_seen),
        optional(record.last_seen),
    ]
}

fn signal_row(signal: &SignalRecord) -> Vec<String> {
    let links: Vec<&str> = signal.links.iter().map(|l| l.url.as_str()).collect();
    vec![
        signal.phrase.clone(),
        signal.category.clone(),
        signal.volume_short.to_string(),
        signal.volume_long.to_string(),
        round_to(signal.growth_ratio, 2).to_string(),
        signal.source_breadth.to_string(),
        round_to(signal.recency_share, 3).to_string(),
        round_to(signal.interest_score, 3).to_string(),
        links.join(" "),
    ]
}

fn series_rows(records: &[TrendRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .flat_map(|r| {
            r.series
                .iter()
                .map(move |(bucket, count)| vec![r.phrase.clone(), bucket.to_string(), count.to_string()])
        })
        .collect()
}

fn count_rows(counts: &[(String, u64)]) -> Vec<Vec<String>> {
    counts
        .iter()
        .map(|(item, count)| vec![item.clone(), count.to_string()])
        .collect()
}

fn tier_rows(pick: &TierPick) -> Vec<Vec<String>> {
    pick.records
        .iter()
        .map(|r| {
            let mut row = vec![pick.tier.to_string()];
            row.extend(trend_row(r));
            row
        })
        .collect()
}

/// Writes report artifacts under one output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    prefix: String,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/<prefix>_<name>`
    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{name}", self.prefix))
    }

    /// Fill a temporary file next to `path`, then rename it into place
    fn write_atomic<F>(&self, path: &Path, fill: F) -> Result<()>
    where
        F: FnOnce(BufWriter<File>) -> io::Result<()>,
    {
        let temp = temp_path(path);
        fs::create_dir_all(&self.output_dir)
            .and_then(|()| File::create(&temp))
            .and_then(|file| fill(BufWriter::new(file)))
            .and_then(|()| fs::rename(&temp, path))
            .map_err(|source| {
                let _ = fs::remove_file(&temp);
                Error::Output {
                    path: path.to_path_buf(),
                    source,
                }
            })
    }

    /// Write a CSV table; the header is written even without rows
    pub fn write_csv(&self, path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<PathBuf> {
        self.write_atomic(path, |file| {
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(header)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()
        })?;

        tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote table");
        Ok(path.to_path_buf())
    }

    /// Write a pretty-printed JSON document
    pub fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<PathBuf> {
        self.write_atomic(path, |mut file| {
            serde_json::to_writer_pretty(&mut file, value)?;
            file.write_all(b"\n")?;
            file.flush()
        })?;

        tracing::debug!(path = %path.display(), "Wrote document");
        Ok(path.to_path_buf())
    }

    /// `<output_dir>/signals.json`
    pub fn write_signals(&self, report: &SignalsReport) -> Result<Vec<PathBuf>> {
        let path = self.output_dir.join("signals.json");
        Ok(vec![self.write_json(&path, report)?])
    }

    fn write_signal_table(&self, name: &str, signals: &[SignalRecord]) -> Result<PathBuf> {
        let rows: Vec<Vec<String>> = signals.iter().map(signal_row).collect();
        self.write_csv(&self.artifact_path(name), &SIGNAL_HEADER, &rows)
    }

    /// Every open-vocabulary artifact
    pub fn write_discovery(&self, report: &DiscoveryReport) -> Result<Vec<PathBuf>> {
        let trend_rows: Vec<Vec<String>> = report.records.iter().map(trend_row).collect();
        Ok(vec![
            self.write_csv(&self.artifact_path("top_phrases.csv"), &TREND_HEADER, &trend_rows)?,
            self.write_csv(
                &self.artifact_path("phrase_counts_over_time.csv"),
                &["phrase", "bucket", "count"],
                &series_rows(&report.records),
            )?,
            self.write_signal_table("increasing_terms.csv", &report.increasing)?,
            self.write_signal_table("decreasing_terms.csv", &report.decreasing)?,
            self.write_signal_table("new_terms.csv", &report.emerging)?,
            self.write_json(&self.artifact_path("signals.json"), &report.signals)?,
        ])
    }

    /// Every closed-vocabulary artifact
    pub fn write_terms(&self, report: &TermsReport) -> Result<Vec<PathBuf>> {
        let mut tier_header = vec!["tier"];
        tier_header.extend(TREND_HEADER);
        let trend_rows: Vec<Vec<String>> = report.records.iter().map(trend_row).collect();

        Ok(vec![
            self.write_csv(
                &self.artifact_path("top_words.csv"),
                &["word", "count"],
                &count_rows(&report.top_words),
            )?,
            self.write_csv(
                &self.artifact_path("top_bigrams.csv"),
                &["bigram", "count"],
                &count_rows(&report.top_bigrams),
            )?,
            self.write_csv(
                &self.artifact_path("term_counts_over_time.csv"),
                &["term", "bucket", "count"],
                &series_rows(&report.records),
            )?,
            self.write_csv(&self.artifact_path("trend_results.csv"), &TREND_HEADER, &trend_rows)?,
            self.write_csv(
                &self.artifact_path("increasing_terms.csv"),
                &tier_header,
                &tier_rows(&report.increasing),
            )?,
            self.write_csv(
                &self.artifact_path("decreasing_terms.csv"),
                &tier_header,
                &tier_rows(&report.decreasing),
            )?,
        ])
    }
}
