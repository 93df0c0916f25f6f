//! Tolerant JSON reading.
//!
//! Configuration files are hand-edited, so they may carry `//` and `/* */`
//! comments and trailing commas. Both are removed with a string-aware scan
//! before the text is handed to `serde_json`.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Parse JSON-with-comments text into `T`.
pub fn parse<T: DeserializeOwned>(text: &str) -> AppResult<T> {
    let cleaned = strip_trailing_commas(&strip_comments(text));
    Ok(serde_json::from_str(&cleaned)?)
}

/// Read and parse a JSONC file.
///
/// Returns `Ok(None)` when the file does not exist; read and parse
/// failures are errors so the caller can decide how loudly to degrade.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::Config(format!(
                "Failed to read {:?}: {}",
                path, e
            )))
        }
    };

    parse(&contents)
        .map(Some)
        .map_err(|e| AppError::Config(format!("Failed to parse {:?}: {}", path, e)))
}

/// Remove `//` line comments and `/* */` block comments outside strings.
///
/// Line comments keep their terminating newline so error positions reported
/// by the parser still point at the right line.
pub fn strip_comments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        result.push('\n');
                    }
                    prev = next;
                }
            }
            _ => result.push(c),
        }
    }

    result
}

/// Remove commas that are directly followed (modulo whitespace) by `}` or `]`.
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some(&'}') | Some(&']')) {
                continue;
            }
        }
        result.push(c);
    }

    result
}
