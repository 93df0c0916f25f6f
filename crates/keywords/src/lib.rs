//! Keyword engine for keyhook.
//!
//! Turns a submitted prompt into an instruction payload:
//! - Load the keyword table (file or built-in)
//! - Skip everything when `features.magicKeywords` is off
//! - Apply configured trigger overrides
//! - Strip code, URLs, paths and tags from the prompt
//! - Match triggers and order matches by priority
//! - Format the banner, instructions and skill directives
//!
//! Every stage is total. Failures degrade to an empty table or no match, and
//! the resulting payload always lets the host continue.

pub mod builder;
pub mod detect;
pub mod loader;
pub mod overrides;
pub mod sanitize;
pub mod types;

#[cfg(test)]
mod tests;

use keyhook_core::Config;

// Re-export main types
pub use builder::{build_payload, format_context};
pub use detect::{detect_keywords, KeywordMatcher};
pub use loader::{load_keywords, parse_keywords, KeywordSource};
pub use overrides::apply_overrides;
pub use sanitize::sanitize;
pub use types::{HookSpecificOutput, InstructionPayload, Keyword};

/// Run the full keyword pipeline for `prompt`.
///
/// # Example
/// ```no_run
/// use keyhook_core::Config;
/// use keyhook_keywords::{process, KeywordSource};
///
/// let payload = process("please review this", &Config::default(), &KeywordSource::Embedded);
/// println!("{}", serde_json::to_string(&payload).unwrap());
/// ```
pub fn process(prompt: &str, config: &Config, source: &KeywordSource) -> InstructionPayload {
    if !config.features.magic_keywords {
        tracing::debug!("Magic keywords disabled");
        return InstructionPayload::proceed();
    }

    let table = load_keywords(source);
    if table.is_empty() {
        return InstructionPayload::proceed();
    }

    let table = apply_overrides(&table, &config.magic_keywords);
    let text = sanitize(prompt);
    let matcher = KeywordMatcher::new(&table);
    let matches = matcher.detect(&text);

    tracing::debug!(
        "Matched keywords: {:?}",
        matches.iter().map(|k| k.name.as_str()).collect::<Vec<_>>()
    );

    build_payload(&matches)
}

/// The keyword table in effect for `config`, with overrides applied.
///
/// Empty when magic keywords are disabled.
pub fn active_keywords(config: &Config, source: &KeywordSource) -> Vec<Keyword> {
    if !config.features.magic_keywords {
        return Vec::new();
    }

    let table = load_keywords(source);
    apply_overrides(&table, &config.magic_keywords).into_owned()
}
