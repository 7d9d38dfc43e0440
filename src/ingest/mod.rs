//! Document table loading
//!
//! Collectors write their output as CSV, JSON arrays or JSON lines with
//! slightly different column names. Every table is read into [`Document`]s;
//! rows without a usable timestamp are dropped and counted. Missing or
//! unreadable tables are skipped with a warning so that one broken collector
//! never stops a run.

use crate::error::Result;
use crate::models::{Document, SourceKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Counters describing one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Tables read successfully
    pub tables_read: usize,
    /// Tables missing or unreadable
    pub tables_skipped: usize,
    /// Rows seen across all tables
    pub rows_read: usize,
    /// Rows dropped for missing or unparseable timestamps or bad shape
    pub dropped_rows: usize,
}

impl IngestStats {
    /// Documents kept
    #[must_use]
    pub fn kept_rows(&self) -> usize {
        self.rows_read - self.dropped_rows
    }
}

/// Documents loaded from one or more tables
#[derive(Debug, Clone, Default)]
pub struct DocumentTable {
    pub documents: Vec<Document>,
    pub stats: IngestStats,
}

/// On-disk table layout, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
    JsonLines,
}

impl TableFormat {
    /// Detect from extension; anything unknown is read as CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("jsonl") | Some("ndjson") => Self::JsonLines,
            _ => Self::Csv,
        }
    }
}

/// Timestamp cell as found in the wild
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Epoch(i64),
    Fractional(f64),
    Text(String),
}

impl RawTimestamp {
    /// Resolve to a UTC instant
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(secs) => DateTime::from_timestamp(*secs, 0),
            Self::Fractional(secs) => epoch_float_to_dt(*secs),
            Self::Text(text) => parse_timestamp(text),
        }
    }
}

fn epoch_float_to_dt(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Parse a timestamp string: epoch seconds, RFC 3339, RFC 2822 or a naive
/// date/time taken as UTC
///
/// # Examples
///
/// ```
/// use trendline::ingest::parse_timestamp;
///
/// assert!(parse_timestamp("1704888000").is_some());
/// assert!(parse_timestamp("2024-01-10T12:00:00+09:00").is_some());
/// assert!(parse_timestamp("2024-01-10").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(secs) = s.parse::<f64>() {
        return epoch_float_to_dt(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let fmts = [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%:z",
    ];
    for f in fmts.iter() {
        if let Ok(dt) = DateTime::parse_from_str(s, f) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    let naive = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for f in naive.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// One row as written by any collector; aliases are resolved in
/// [`RawRow::into_document`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub source: Option<String>,
    pub category: Option<String>,
    pub subreddit: Option<String>,
    pub query: Option<String>,
    pub domain: Option<String>,
    pub timestamp: Option<RawTimestamp>,
    pub created_utc: Option<RawTimestamp>,
    pub date: Option<RawTimestamp>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub text: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawRow {
    /// Build a document, or `None` when no timestamp column parses
    pub fn into_document(self) -> Option<Document> {
        let timestamp = [&self.timestamp, &self.created_utc, &self.date]
            .into_iter()
            .flatten()
            .find_map(RawTimestamp::to_utc)?;

        let category = non_empty(self.category)
            .or_else(|| non_empty(self.subreddit))
            .or_else(|| non_empty(self.query))
            .or_else(|| non_empty(self.domain))
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| "mixed".to_string());

        let body = non_empty(self.body)
            .or_else(|| non_empty(self.text))
            .or_else(|| non_empty(self.summary))
            .unwrap_or_default();

        Some(Document {
            source: SourceKind::parse(self.source.as_deref().unwrap_or("")),
            category,
            timestamp,
            title: self.title.unwrap_or_default(),
            body,
            url: non_empty(self.url).map(|u| u.trim().to_string()),
        })
    }
}

/// Rows and drop count from one table
#[derive(Debug, Default)]
struct TableRows {
    documents: Vec<Document>,
    rows: usize,
    dropped: usize,
}

impl TableRows {
    fn push(&mut self, row: Option<RawRow>) {
        self.rows += 1;
        match row.and_then(RawRow::into_document) {
            Some(doc) => self.documents.push(doc),
            None => self.dropped += 1,
        }
    }
}

fn read_csv(path: &Path) -> Result<TableRows> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let mut table = TableRows::default();
    for row in reader.deserialize::<RawRow>() {
        table.push(row.ok());
    }
    Ok(table)
}

fn read_json(path: &Path) -> Result<TableRows> {
    let reader = BufReader::new(File::open(path)?);
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut table = TableRows::default();
    for value in values {
        table.push(serde_json::from_value::<RawRow>(value).ok());
    }
    Ok(table)
}

fn read_json_lines(path: &Path) -> Result<TableRows> {
    let reader = BufReader::new(File::open(path)?);
    let mut table = TableRows::default();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        table.push(serde_json::from_str::<RawRow>(&line).ok());
    }
    Ok(table)
}

/// Read a single table
///
/// Malformed rows are counted, not fatal; I/O and top-level parse errors
/// are returned.
pub fn read_table(path: &Path) -> Result<(Vec<Document>, IngestStats)> {
    let table = match TableFormat::from_path(path) {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Json => read_json(path)?,
        TableFormat::JsonLines => read_json_lines(path)?,
    };
    let stats = IngestStats {
        tables_read: 1,
        tables_skipped: 0,
        rows_read: table.rows,
        dropped_rows: table.dropped,
    };
    Ok((table.documents, stats))
}

/// Read and concatenate tables, skipping missing or unreadable ones
pub fn load_tables(paths: &[PathBuf]) -> DocumentTable {
    let mut out = DocumentTable::default();
    for path in paths {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Document table missing, skipping");
            out.stats.tables_skipped += 1;
            continue;
        }
        match read_table(path) {
            Ok((documents, stats)) => {
                if stats.dropped_rows > 0 {
                    tracing::warn!(
                        path = %path.display(),
                        dropped = stats.dropped_rows,
                        "Dropped malformed rows"
                    );
                }
                tracing::debug!(path = %path.display(), rows = stats.rows_read, "Read table");
                out.documents.extend(documents);
                out.stats.tables_read += 1;
                out.stats.rows_read += stats.rows_read;
                out.stats.dropped_rows += stats.dropped_rows;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable document table, skipping");
                out.stats.tables_skipped += 1;
            }
        }
    }

    tracing::info!(
        tables = out.stats.tables_read,
        skipped = out.stats.tables_skipped,
        documents = out.documents.len(),
        dropped = out.stats.dropped_rows,
        "Loaded documents"
    );
    out
}
