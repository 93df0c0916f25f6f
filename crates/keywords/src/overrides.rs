//! Per-keyword trigger overrides from configuration.

use crate::types::Keyword;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Replace the triggers of every keyword named in `overrides`.
///
/// Only `triggers` change; priority, instruction and skill are kept. When no
/// override names a keyword in `table`, the table itself is returned
/// borrowed. An empty override list leaves the keyword unable to match.
pub fn apply_overrides<'a>(
    table: &'a [Keyword],
    overrides: &BTreeMap<String, Vec<String>>,
) -> Cow<'a, [Keyword]> {
    if overrides.is_empty() || !table.iter().any(|k| overrides.contains_key(&k.name)) {
        return Cow::Borrowed(table);
    }

    let overridden = table
        .iter()
        .map(|keyword| match overrides.get(&keyword.name) {
            Some(triggers) => {
                tracing::debug!("Overriding triggers for '{}'", keyword.name);
                Keyword {
                    triggers: triggers.clone(),
                    ..keyword.clone()
                }
            }
            None => keyword.clone(),
        })
        .collect();

    Cow::Owned(overridden)
}
