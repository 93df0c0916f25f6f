//! Trigger matching.

use crate::types::Keyword;
use regex::Regex;

/// Compiled matchers for one keyword table.
///
/// Built once per pipeline run, since the table may be overridden per call.
#[derive(Debug)]
pub struct KeywordMatcher<'a> {
    entries: Vec<(&'a Keyword, Regex)>,
}

impl<'a> KeywordMatcher<'a> {
    /// Compile one case-insensitive matcher per keyword.
    ///
    /// Keywords without usable triggers are left out.
    pub fn new(table: &'a [Keyword]) -> Self {
        let entries = table
            .iter()
            .filter_map(|keyword| {
                let pattern = build_pattern(&keyword.triggers)?;
                match Regex::new(&pattern) {
                    Ok(re) => Some((keyword, re)),
                    Err(e) => {
                        tracing::warn!("Skipping keyword '{}': {}", keyword.name, e);
                        None
                    }
                }
            })
            .collect();

        Self { entries }
    }

    /// Number of keywords that can match.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keywords with at least one trigger in `text`, by ascending priority.
    ///
    /// Equal priorities keep table order.
    pub fn detect(&self, text: &str) -> Vec<&'a Keyword> {
        let mut matches: Vec<&'a Keyword> = self
            .entries
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(keyword, _)| *keyword)
            .collect();

        // Vec::sort_by_key is stable
        matches.sort_by_key(|keyword| keyword.priority);
        matches
    }
}

/// Build the disjunction for a trigger list, or `None` if every trigger is blank.
///
/// Each trigger is escaped and matched as a whole phrase: a word boundary is
/// required at each end that starts or ends with a word character.
pub fn build_pattern(triggers: &[String]) -> Option<String> {
    let alternatives: Vec<String> = triggers
        .iter()
        .map(|trigger| trigger.trim())
        .filter(|trigger| !trigger.is_empty())
        .map(|trigger| {
            let lead = if starts_with_word_char(trigger) { r"\b" } else { "" };
            let tail = if ends_with_word_char(trigger) { r"\b" } else { "" };
            format!("{}{}{}", lead, regex::escape(trigger), tail)
        })
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    Some(format!("(?i)(?:{})", alternatives.join("|")))
}

fn starts_with_word_char(s: &str) -> bool {
    s.chars().next().is_some_and(is_word_char)
}

fn ends_with_word_char(s: &str) -> bool {
    s.chars().next_back().is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Detect keywords from `table` in already-sanitized `text`.
pub fn detect_keywords<'a>(text: &str, table: &'a [Keyword]) -> Vec<&'a Keyword> {
    KeywordMatcher::new(table).detect(text)
}
