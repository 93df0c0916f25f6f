//! Command handlers for the keyhook CLI.
//!
//! Hook commands (`prompt-submit`, `session-start`) always print a payload
//! that lets the host continue. `config` and `state` are for people.

pub mod config;
pub mod prompt_submit;
pub mod session_start;
pub mod state;

// Re-export command types for convenience
pub use config::ConfigCommand;
pub use prompt_submit::PromptSubmitCommand;
pub use session_start::SessionStartCommand;
pub use state::StateCommand;
