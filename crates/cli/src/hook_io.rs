//! Host-facing plumbing: hook JSON on stdin, payload JSON on stdout.

use keyhook_core::AppResult;
use keyhook_keywords::InstructionPayload;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Fields keyhook reads from the host's hook event.
///
/// Unknown fields are ignored; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub prompt: Option<String>,
}

impl HookInput {
    /// Working directory for this event: the event's `cwd`, then the
    /// `--cwd` flag, then the process working directory.
    pub fn working_dir(&self, cli_cwd: Option<&Path>) -> PathBuf {
        self.cwd
            .clone()
            .or_else(|| cli_cwd.map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Read the hook event from stdin.
///
/// Unreadable or malformed input degrades to an empty event.
pub fn read_hook_input() -> HookInput {
    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        tracing::warn!("Failed to read hook input: {}", e);
        return HookInput::default();
    }
    parse_hook_input(&raw)
}

/// Parse a hook event, degrading to an empty event on bad JSON.
pub fn parse_hook_input(raw: &str) -> HookInput {
    if raw.trim().is_empty() {
        return HookInput::default();
    }

    match serde_json::from_str(raw) {
        Ok(input) => {
            let input: HookInput = input;
            tracing::debug!("Hook event: {:?}", input.hook_event_name);
            input
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed hook input: {}", e);
            HookInput::default()
        }
    }
}

/// Print `payload` as a single JSON line on stdout.
pub fn emit(payload: &InstructionPayload) -> AppResult<()> {
    println!("{}", serde_json::to_string(payload)?);
    Ok(())
}
