//! keyhook CLI
//!
//! Entry point invoked by the host once per hook event. Hook subcommands
//! read the event from stdin and print an instruction payload on stdout.

mod commands;
mod hook_io;

use clap::{Parser, Subcommand};
use commands::{ConfigCommand, PromptSubmitCommand, SessionStartCommand, StateCommand};
use keyhook_core::logging;
use std::path::PathBuf;

/// keyhook - prompt keyword and session hooks
#[derive(Parser, Debug)]
#[command(name = "keyhook")]
#[command(about = "Prompt keyword detection and session hooks", long_about = None)]
#[command(version)]
struct Cli {
    /// Working directory when the hook event does not carry one
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Keyword table to use instead of the project or built-in table
    #[arg(short, long, global = true)]
    keywords: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "KEYHOOK_LOG")]
    log_level: Option<String>,

    /// Disable colored output (`NO_COLOR` is honored as well)
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle a UserPromptSubmit event
    PromptSubmit(PromptSubmitCommand),

    /// Handle a SessionStart event
    SessionStart(SessionStartCommand),

    /// Show the resolved configuration
    Config(ConfigCommand),

    /// Inspect or edit persisted state
    State(StateCommand),
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub cwd: Option<PathBuf>,
    pub keywords: Option<PathBuf>,
}

impl GlobalOptions {
    /// Working directory for non-hook commands.
    pub fn working_dir(&self) -> PathBuf {
        self.cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A bad log filter must not keep the hook from answering
    if let Err(e) = logging::init_logging(cli.log_level.as_deref(), cli.no_color) {
        eprintln!("keyhook: {}", e);
    }

    let command_name = match &cli.command {
        Commands::PromptSubmit(_) => "prompt-submit",
        Commands::SessionStart(_) => "session-start",
        Commands::Config(_) => "config",
        Commands::State(_) => "state",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let options = GlobalOptions {
        cwd: cli.cwd,
        keywords: cli.keywords,
    };

    let result = match cli.command {
        Commands::PromptSubmit(cmd) => cmd.execute(&options),
        Commands::SessionStart(cmd) => cmd.execute(&options),
        Commands::Config(cmd) => cmd.execute(&options),
        Commands::State(cmd) => cmd.execute(&options),
    };

    match &result {
        Ok(_) => tracing::debug!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_env_does_not_break_parsing() {
        std::env::set_var("NO_COLOR", "1");

        let cli = Cli::try_parse_from(["keyhook", "prompt-submit"]).unwrap();
        assert!(!cli.no_color);
        assert!(matches!(cli.command, Commands::PromptSubmit(_)));

        let cli = Cli::try_parse_from(["keyhook", "--no-color", "session-start"]).unwrap();
        assert!(cli.no_color);

        std::env::remove_var("NO_COLOR");
    }
}
