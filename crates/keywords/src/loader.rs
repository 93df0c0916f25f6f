//! Keyword table loader.

use crate::types::Keyword;
use keyhook_core::config::PROJECT_DIR_NAME;
use keyhook_core::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name of a project keyword table under `.keyhook/`.
pub const KEYWORDS_FILE_NAME: &str = "keywords.json";

/// Keyword table compiled into the binary.
pub const EMBEDDED_KEYWORDS: &str = include_str!("../keywords.json");

/// Where the keyword table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSource {
    /// A JSON document on disk
    File(PathBuf),
    /// The built-in table
    Embedded,
}

impl KeywordSource {
    /// Pick the table for `cwd`.
    ///
    /// An explicit path wins; otherwise `<cwd>/.keyhook/keywords.json` is used
    /// when it exists, falling back to the built-in table.
    pub fn discover(cwd: &Path, explicit: Option<PathBuf>) -> Self {
        if let Some(path) = explicit {
            return KeywordSource::File(path);
        }

        let project_table = project_keywords_path(cwd);
        if project_table.is_file() {
            KeywordSource::File(project_table)
        } else {
            KeywordSource::Embedded
        }
    }
}

/// Path of the project keyword table under `cwd`.
pub fn project_keywords_path(cwd: &Path) -> PathBuf {
    cwd.join(PROJECT_DIR_NAME).join(KEYWORDS_FILE_NAME)
}

/// Load the keyword table from `source`.
///
/// Never fails: a missing file, unreadable file or malformed document all
/// yield an empty table.
pub fn load_keywords(source: &KeywordSource) -> Vec<Keyword> {
    match try_load(source) {
        Ok(table) => {
            tracing::debug!("Loaded {} keywords from {:?}", table.len(), source);
            table
        }
        Err(e) => {
            tracing::warn!("Using empty keyword table: {}", e);
            Vec::new()
        }
    }
}

fn try_load(source: &KeywordSource) -> AppResult<Vec<Keyword>> {
    match source {
        KeywordSource::Embedded => parse_keywords(EMBEDDED_KEYWORDS),
        KeywordSource::File(path) => match std::fs::read_to_string(path) {
            Ok(contents) => parse_keywords(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Keyword table not found: {:?}", path);
                Ok(Vec::new())
            }
            Err(e) => Err(AppError::Keyword(format!(
                "Failed to read keyword table {:?}: {}",
                path, e
            ))),
        },
    }
}

/// Parse a keyword table document.
///
/// The top level must be an array. Individual records that do not parse,
/// carry no usable trigger, or repeat an earlier name are skipped.
pub fn parse_keywords(text: &str) -> AppResult<Vec<Keyword>> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Array(records) = document else {
        return Err(AppError::Keyword(
            "Keyword table must be a JSON array".to_string(),
        ));
    };

    let mut seen = HashSet::new();
    let mut table = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let mut keyword: Keyword = match serde_json::from_value(record) {
            Ok(keyword) => keyword,
            Err(e) => {
                tracing::warn!("Skipping keyword record {}: {}", index, e);
                continue;
            }
        };

        keyword.triggers.retain(|trigger| !trigger.trim().is_empty());
        if keyword.triggers.is_empty() {
            tracing::warn!("Skipping keyword '{}': no triggers", keyword.name);
            continue;
        }

        if !seen.insert(keyword.name.clone()) {
            tracing::warn!("Skipping duplicate keyword '{}'", keyword.name);
            continue;
        }

        table.push(keyword);
    }

    Ok(table)
}
