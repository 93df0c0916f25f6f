//! Prompt sanitization ahead of trigger matching.
//!
//! Code, URLs, paths and markup often contain words that look like triggers
//! (`review.rs`, `<plan>`, a fenced diff). Those spans are removed before
//! detection. The host still receives the original prompt.

use regex::Regex;
use std::sync::LazyLock;

/// Fenced code blocks, spanning newlines, shortest match
#[allow(clippy::expect_used)]
static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

/// Inline code spans
#[allow(clippy::expect_used)]
static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`").expect("valid regex"));

/// Absolute http(s) URLs
#[allow(clippy::expect_used)]
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Two or more `/`-separated segments, optionally led by `.` or `/`
#[allow(clippy::expect_used)]
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.?/?[\w.\-]+(?:/[\w.\-]+)+/?").expect("valid regex")
});

/// Tag-like markup such as `<plan>` or `</div>`
#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z!][^<>]*>").expect("valid regex"));

/// Strip code, URLs, paths and tags from `prompt`.
///
/// Patterns apply in a fixed order (fenced code, inline code, URLs, paths,
/// tags) and each removed span leaves nothing behind.
pub fn sanitize(prompt: &str) -> String {
    [
        &*FENCED_CODE_RE,
        &*INLINE_CODE_RE,
        &*URL_RE,
        &*PATH_RE,
        &*TAG_RE,
    ]
    .iter()
    .fold(prompt.to_string(), |text, re| {
        re.replace_all(&text, "").into_owned()
    })
}
