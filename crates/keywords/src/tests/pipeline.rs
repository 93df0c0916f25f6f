//! End-to-end tests for `process`.

use crate::loader::KeywordSource;
use crate::{active_keywords, process};
use keyhook_core::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"[
        {"name": "thorough", "triggers": ["thorough"], "priority": 10, "instruction": "Be thorough."},
        {"name": "review", "triggers": ["review"], "priority": 1, "instruction": "Review it.", "skill": "code-review"},
        {"name": "plan", "triggers": ["make a plan"], "priority": 5, "instruction": "Plan first."}
    ]"#;

    fn write_table(dir: &TempDir, contents: &str) -> KeywordSource {
        let path: PathBuf = dir.path().join("keywords.json");
        fs::write(&path, contents).unwrap();
        KeywordSource::File(path)
    }

    #[test]
    fn test_review_and_thorough_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_table(&temp_dir, TABLE);

        let payload = process(
            "please do a thorough review of my code",
            &Config::default(),
            &source,
        );

        assert!(payload.proceed);
        let context = payload.context().unwrap();
        assert!(context.starts_with("[MAGIC KEYWORDS: REVIEW, THOROUGH]"));
        assert!(context.find("## REVIEW").unwrap() < context.find("## THOROUGH").unwrap());
        assert!(context.contains("Skill: code-review"));
    }

    #[test]
    fn test_trigger_only_in_code_block_does_not_fire() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_table(&temp_dir, TABLE);

        let prompt = "what does this do?\n```\n// TODO review\nlet x = 1;\n```";
        let payload = process(prompt, &Config::default(), &source);
        assert!(payload.context().is_none());
    }

    #[test]
    fn test_trigger_in_path_or_url_does_not_fire() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_table(&temp_dir, TABLE);

        let payload = process(
            "open src/review/mod.rs and https://example.com/review",
            &Config::default(),
            &source,
        );
        assert!(payload.context().is_none());
    }

    #[test]
    fn test_feature_gate_disables_detection() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_table(&temp_dir, TABLE);
        let mut config = Config::default();
        config.features.magic_keywords = false;

        let payload = process("review this", &config, &source);
        assert!(payload.proceed);
        assert!(payload.hook_specific_output.is_none());
        assert!(active_keywords(&config, &source).is_empty());
    }

    #[test]
    fn test_overrides_change_triggers() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_table(&temp_dir, TABLE);
        let mut config = Config::default();
        config
            .magic_keywords
            .insert("review".to_string(), vec!["inspect".to_string()]);

        assert!(process("review this", &config, &source).context().is_none());

        let payload = process("inspect this", &config, &source);
        let context = payload.context().unwrap();
        assert!(context.starts_with("[MAGIC KEYWORD: REVIEW]"));
        assert!(context.contains("Review it."));

        let active = active_keywords(&config, &source);
        assert_eq!(active[1].triggers, vec!["inspect".to_string()]);
    }

    #[test]
    fn test_broken_table_degrades_to_noop() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_table(&temp_dir, "not json at all");

        let payload = process("review this", &Config::default(), &source);
        assert_eq!(payload, crate::InstructionPayload::proceed());
    }

    #[test]
    fn test_embedded_table_detects_review() {
        let payload = process(
            "Can you REVIEW the parser?",
            &Config::default(),
            &KeywordSource::Embedded,
        );
        let context = payload.context().unwrap();
        assert!(context.contains("REVIEW"));
    }

    #[test]
    fn test_no_match_is_noop() {
        let payload = process(
            "hello there",
            &Config::default(),
            &KeywordSource::Embedded,
        );
        assert!(payload.context().is_none());
    }
}
