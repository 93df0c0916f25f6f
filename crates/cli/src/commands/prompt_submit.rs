//! UserPromptSubmit hook.
//!
//! Runs the keyword engine over the submitted prompt.

use clap::Args;
use keyhook_core::config;
use keyhook_keywords::{process, InstructionPayload, KeywordSource};

use crate::hook_io::{emit, read_hook_input, HookInput};
use crate::GlobalOptions;

/// Handle a UserPromptSubmit event
#[derive(Args, Debug)]
pub struct PromptSubmitCommand {
    /// Prompt text to use instead of reading the event from stdin
    #[arg(short, long)]
    pub prompt: Option<String>,
}

impl PromptSubmitCommand {
    pub fn execute(&self, options: &GlobalOptions) -> anyhow::Result<()> {
        let input = match &self.prompt {
            Some(prompt) => HookInput {
                prompt: Some(prompt.clone()),
                ..HookInput::default()
            },
            None => read_hook_input(),
        };

        let payload = payload_for(&input, options);
        emit(&payload)?;
        Ok(())
    }
}

/// Compute the payload for one prompt event.
pub fn payload_for(input: &HookInput, options: &GlobalOptions) -> InstructionPayload {
    let Some(prompt) = input.prompt.as_deref() else {
        tracing::debug!("No prompt in hook input");
        return InstructionPayload::proceed();
    };

    let cwd = input.working_dir(options.cwd.as_deref());
    let config = config::resolve(&cwd);
    let source = KeywordSource::discover(&cwd, options.keywords.clone());

    tracing::debug!("Keyword source: {:?}", source);
    process(prompt, &config, &source)
}
