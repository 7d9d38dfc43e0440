//! Filter and term list files
//!
//! The filters file holds synonyms, ban lists and per-category allow-lists.
//! It is read as JSON or TOML depending on the extension and compiled once
//! into [`PhraseFilters`].

use crate::analytics::phrases::{AllowFilter, BanFilter, SynonymTable};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub use crate::analytics::phrases::PhraseFilters;

/// Raw filters file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Canonical phrase -> variant spellings
    pub synonyms: BTreeMap<String, Vec<String>>,

    /// Literal phrases (and tokens) never reported
    pub banlist: Vec<String>,

    /// Patterns; a matching phrase is never reported
    pub ban_regex: Vec<String>,

    /// Named entities with the same effect as the ban list
    pub ban_entities: Vec<String>,

    /// Category -> patterns; non-matching phrases are demoted, not dropped
    pub allowlist: BTreeMap<String, Vec<String>>,
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

impl FilterConfig {
    /// Load a filters file; a missing file is fatal
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing(path));
        }
        let content = std::fs::read_to_string(path)?;
        let config = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    /// Compile into the immutable filter set used by the extractor
    pub fn compile(&self) -> Result<PhraseFilters> {
        let filters = PhraseFilters {
            synonyms: SynonymTable::new(&self.synonyms),
            ban: BanFilter::new(&self.banlist, &self.ban_regex, &self.ban_entities)?,
            allow: AllowFilter::new(&self.allowlist)?,
        };
        tracing::debug!(
            synonyms = filters.synonyms.len(),
            banlist = self.banlist.len(),
            ban_regex = self.ban_regex.len(),
            ban_entities = self.ban_entities.len(),
            allow_categories = self.allowlist.len(),
            "Compiled phrase filters"
        );
        Ok(filters)
    }
}

#[derive(Deserialize)]
struct TermsFile {
    #[serde(default)]
    terms: Vec<String>,
}

/// Load a closed-vocabulary term list
///
/// Accepts `{"terms": [...]}` JSON or one term per line. Terms are trimmed
/// and lowercased; blanks and repeats are dropped, first occurrence kept.
/// A missing file is fatal.
pub fn load_terms(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::missing(path));
    }
    let content = std::fs::read_to_string(path)?;
    let raw: Vec<String> = if is_json(path) {
        serde_json::from_str::<TermsFile>(&content)?.terms
    } else {
        content.lines().map(str::to_string).collect()
    };

    let mut seen = HashSet::new();
    let terms: Vec<String> = raw
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect();

    tracing::info!(path = %path.display(), terms = terms.len(), "Loaded terms");
    Ok(terms)
}
