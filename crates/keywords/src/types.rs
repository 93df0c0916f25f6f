//! Keyword engine types.
//!
//! This module defines the keyword record read from the keyword table and
//! the instruction payload handed back to the host.

use serde::{Deserialize, Serialize};

/// Host event name for prompt submission.
pub const USER_PROMPT_SUBMIT: &str = "UserPromptSubmit";

/// Host event name for session start.
pub const SESSION_START: &str = "SessionStart";

/// Priority given to records that do not declare one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A named trigger rule loaded from the keyword table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    /// Unique keyword identifier
    pub name: String,

    /// Literal phrases that activate the keyword
    pub triggers: Vec<String>,

    /// Lower values are listed first when several keywords match
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Text injected when the keyword fires
    #[serde(default)]
    pub instruction: String,

    /// Follow-on skill to invoke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,

    /// Arguments passed with the skill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_args: Option<String>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// The structured result printed for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionPayload {
    /// Always true: keyhook never blocks the host
    #[serde(rename = "continue")]
    pub proceed: bool,

    /// Side-channel context, absent when there is nothing to inject
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

/// Extra context attached to a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpecificOutput {
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,

    #[serde(rename = "additionalContext")]
    pub additional_context: String,
}

impl InstructionPayload {
    /// Payload that lets the host continue with nothing injected.
    pub fn proceed() -> Self {
        Self {
            proceed: true,
            hook_specific_output: None,
        }
    }

    /// Payload that injects `context` for `event`.
    pub fn with_context(event: &str, context: impl Into<String>) -> Self {
        Self {
            proceed: true,
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: event.to_string(),
                additional_context: context.into(),
            }),
        }
    }

    /// Injected context, if any.
    pub fn context(&self) -> Option<&str> {
        self.hook_specific_output
            .as_ref()
            .map(|output| output.additional_context.as_str())
    }
}

impl Default for InstructionPayload {
    fn default() -> Self {
        Self::proceed()
    }
}
