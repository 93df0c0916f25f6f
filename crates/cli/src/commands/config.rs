//! Config command handler.
//!
//! Prints the configuration a hook would see for the working directory.

use clap::Args;
use keyhook_core::config::{resolve_with, ConfigSources};
use serde_json::json;

use crate::GlobalOptions;

/// Show the resolved configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Also list the files and environment layer that were consulted
    #[arg(long)]
    pub sources: bool,
}

impl ConfigCommand {
    pub fn execute(&self, options: &GlobalOptions) -> anyhow::Result<()> {
        let cwd = options.working_dir();
        let sources = ConfigSources::discover(&cwd);
        let config = resolve_with(&sources);

        tracing::debug!("Resolved config for {:?}", cwd);

        let output = if self.sources {
            json!({
                "config": config,
                "sources": {
                    "userFile": describe_file(sources.user_file.as_deref()),
                    "projectFile": describe_file(sources.project_file.as_deref()),
                    "environment": sources.env,
                }
            })
        } else {
            serde_json::to_value(&config)?
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn describe_file(path: Option<&std::path::Path>) -> serde_json::Value {
    match path {
        Some(path) => json!({
            "path": path.display().to_string(),
            "exists": path.is_file(),
        }),
        None => serde_json::Value::Null,
    }
}
