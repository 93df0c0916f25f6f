//! SessionStart hook.
//!
//! Records the session in the project's session log and, when enabled,
//! tells the host which keywords are active.

use chrono::{DateTime, Utc};
use clap::Args;
use keyhook_core::{config, Config};
use keyhook_keywords::types::SESSION_START;
use keyhook_keywords::{active_keywords, InstructionPayload, Keyword, KeywordSource};
use keyhook_state::{StateLocation, StateStore};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::hook_io::{emit, read_hook_input, HookInput};
use crate::GlobalOptions;

/// Log that receives one record per session start.
pub const SESSION_LOG: &str = "sessions";

/// Handle a SessionStart event
#[derive(Args, Debug)]
pub struct SessionStartCommand {}

/// One line of the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub cwd: String,
    pub started_at: DateTime<Utc>,
}

impl SessionStartCommand {
    pub fn execute(&self, options: &GlobalOptions) -> anyhow::Result<()> {
        let input = read_hook_input();
        let payload = handle_session_start(&input, options);
        emit(&payload)?;
        Ok(())
    }
}

/// Record the session and build the payload.
pub fn handle_session_start(input: &HookInput, options: &GlobalOptions) -> InstructionPayload {
    let cwd = input.working_dir(options.cwd.as_deref());
    let config = config::resolve(&cwd);

    record_session(&StateStore::new(&cwd), input, &cwd);

    if !config.features.session_start_context {
        return InstructionPayload::proceed();
    }

    let source = KeywordSource::discover(&cwd, options.keywords.clone());
    let keywords = active_keywords(&config, &source);
    InstructionPayload::with_context(SESSION_START, session_context(&config, &keywords))
}

fn record_session(store: &StateStore, input: &HookInput, cwd: &Path) {
    let record = SessionRecord {
        session_id: input.session_id.clone(),
        cwd: cwd.display().to_string(),
        started_at: Utc::now(),
    };

    let outcome = store.append(SESSION_LOG, &record, StateLocation::Local);
    if outcome.success {
        tracing::debug!("Recorded session in {:?}", outcome.path);
    }
}

/// Text injected at session start.
pub fn session_context(config: &Config, keywords: &[Keyword]) -> String {
    let mut context = String::from("[KEYHOOK]\n");

    if !config.features.magic_keywords {
        context.push_str("Magic keywords are disabled.\n");
    } else if keywords.is_empty() {
        context.push_str("No magic keywords are configured.\n");
    } else {
        context.push_str("Magic keywords active:\n");
        for keyword in keywords {
            context.push_str(&format!(
                "- {}: {}\n",
                keyword.name.to_uppercase(),
                keyword.triggers.join(", ")
            ));
        }
    }

    context.push_str(&format!(
        "Background task limit: {}",
        config.permissions.max_background_tasks
    ));
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn keyword(name: &str, triggers: &[&str]) -> Keyword {
        Keyword {
            name: name.to_string(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            priority: 1,
            instruction: String::new(),
            skill: None,
            skill_args: None,
        }
    }

    #[test]
    fn test_session_context_lists_keywords() {
        let keywords = vec![keyword("review", &["review", "code review"])];
        let context = session_context(&Config::default(), &keywords);

        assert!(context.contains("- REVIEW: review, code review"));
        assert!(context.ends_with("Background task limit: 5"));
    }

    #[test]
    fn test_session_context_when_disabled() {
        let mut config = Config::default();
        config.features.magic_keywords = false;
        let context = session_context(&config, &[]);
        assert!(context.contains("Magic keywords are disabled."));
    }

    #[test]
    fn test_session_start_records_and_reports() {
        let temp_dir = TempDir::new().unwrap();
        let input = HookInput {
            session_id: Some("s-1".to_string()),
            cwd: Some(temp_dir.path().to_path_buf()),
            ..HookInput::default()
        };
        let options = GlobalOptions {
            cwd: None,
            keywords: None,
        };

        let payload = handle_session_start(&input, &options);
        assert!(payload.proceed);

        let store = StateStore::new(temp_dir.path());
        let records: Vec<SessionRecord> = store.read_log(SESSION_LOG, StateLocation::Local);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].session_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_session_context_can_be_turned_off() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = config::project_config_path(temp_dir.path());
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, r#"{"features": {"sessionStartContext": false}}"#).unwrap();

        let input = HookInput {
            cwd: Some(temp_dir.path().to_path_buf()),
            ..HookInput::default()
        };
        let options = GlobalOptions {
            cwd: None,
            keywords: None,
        };

        let payload = handle_session_start(&input, &options);
        assert_eq!(payload, InstructionPayload::proceed());
    }
}
