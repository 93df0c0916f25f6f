//! State command handler.
//!
//! Manual access to the state store, mostly for debugging hooks.

use anyhow::Context;
use clap::{Args, Subcommand};
use keyhook_state::{StateLocation, StateRead, StateStore};
use serde_json::Value;

use crate::GlobalOptions;

/// Inspect or edit persisted state
#[derive(Args, Debug)]
pub struct StateCommand {
    /// Use the user-global location instead of the project
    #[arg(short, long, global = true)]
    pub global: bool,

    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Print a state document
    Get {
        name: String,
    },
    /// Replace a state document with a JSON value
    Set {
        name: String,
        /// JSON value to store
        value: String,
    },
    /// Append a JSON value to a log
    Append {
        name: String,
        /// JSON value to append
        value: String,
    },
    /// Print every entry of a log
    Log {
        name: String,
    },
    /// Delete a state document (or a log with --log)
    Clear {
        name: String,
        #[arg(long)]
        log: bool,
    },
    /// List state documents
    List,
}

impl StateCommand {
    pub fn execute(&self, options: &GlobalOptions) -> anyhow::Result<()> {
        let store = StateStore::new(&options.working_dir());
        let location = if self.global {
            StateLocation::Global
        } else {
            StateLocation::Local
        };

        tracing::debug!("State action {:?} at {}", self.action, location);

        match &self.action {
            StateAction::Get { name } => match store.read::<Value>(name, location) {
                StateRead::Found { data, .. } => {
                    println!("{}", serde_json::to_string_pretty(&data)?)
                }
                StateRead::Missing => anyhow::bail!("No {} state named '{}'", location, name),
            },
            StateAction::Set { name, value } => {
                let value = parse_value(value)?;
                let outcome = store.write(name, &value, location);
                report(outcome.success, &outcome.path, outcome.error.as_deref())?;
            }
            StateAction::Append { name, value } => {
                let value = parse_value(value)?;
                let outcome = store.append(name, &value, location);
                report(outcome.success, &outcome.path, outcome.error.as_deref())?;
            }
            StateAction::Log { name } => {
                for entry in store.read_log::<Value>(name, location) {
                    println!("{}", serde_json::to_string(&entry)?);
                }
            }
            StateAction::Clear { name, log } => {
                let removed = if *log {
                    store.clear_log(name, location)
                } else {
                    store.clear(name, location)
                };
                println!("{}", if removed { "removed" } else { "not found" });
            }
            StateAction::List => {
                for name in store.list(location) {
                    println!("{}", name);
                }
            }
        }

        Ok(())
    }
}

fn parse_value(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("Value is not valid JSON: {}", raw))
}

fn report(success: bool, path: &std::path::Path, error: Option<&str>) -> anyhow::Result<()> {
    if success {
        println!("{}", path.display());
        Ok(())
    } else {
        anyhow::bail!(
            "Failed to write {}: {}",
            path.display(),
            error.unwrap_or("unknown error")
        )
    }
}
