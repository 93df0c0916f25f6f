//! State locations and name-to-path mapping.

use keyhook_core::config::PROJECT_DIR_NAME;
use keyhook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Subdirectory holding state files under the keyhook directory.
pub const STATE_DIR_NAME: &str = "state";

/// Extension for whole-document state.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Extension for append-only logs.
pub const LOG_EXTENSION: &str = "jsonl";

/// Scope of a state entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateLocation {
    /// Rooted at the project directory
    #[default]
    Local,
    /// Rooted at the user's home directory
    Global,
}

impl fmt::Display for StateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateLocation::Local => write!(f, "local"),
            StateLocation::Global => write!(f, "global"),
        }
    }
}

impl FromStr for StateLocation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StateLocation::Local),
            "global" => Ok(StateLocation::Global),
            other => Err(AppError::State(format!(
                "Unknown state location: {}. Expected 'local' or 'global'",
                other
            ))),
        }
    }
}

/// State directory for a project root: `<root>/.keyhook/state`.
pub fn local_state_dir(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR_NAME).join(STATE_DIR_NAME)
}

/// State directory in the user's home: `~/.keyhook/state`.
///
/// Falls back to the current directory when no home directory is known.
pub fn global_state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROJECT_DIR_NAME)
        .join(STATE_DIR_NAME)
}

/// Map a state name to a file name relative to the state directory.
///
/// A bare name gets `default_extension`; a name that already has an
/// extension is kept verbatim. Names may nest (`modes/ultra`) but must stay
/// inside the state directory: absolute paths, drive prefixes and `..` are
/// rejected.
pub fn file_name_for(name: &str, default_extension: &str) -> AppResult<PathBuf> {
    validate_name(name)?;

    let path = PathBuf::from(name);
    if path.extension().is_some() {
        Ok(path)
    } else {
        Ok(PathBuf::from(format!("{}.{}", name, default_extension)))
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    let components: Vec<Component<'_>> = Path::new(name).components().collect();

    let contained = components
        .iter()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    let named = components.iter().any(|c| matches!(c, Component::Normal(_)));

    if contained && named {
        Ok(())
    } else {
        Err(AppError::State(format!(
            "Invalid state name {:?}: must be a relative path inside the state directory",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name_gets_extension() {
        assert_eq!(
            file_name_for("session", DOCUMENT_EXTENSION).unwrap(),
            PathBuf::from("session.json")
        );
        assert_eq!(
            file_name_for("events", LOG_EXTENSION).unwrap(),
            PathBuf::from("events.jsonl")
        );
        assert_eq!(
            file_name_for("modes/ultra", DOCUMENT_EXTENSION).unwrap(),
            PathBuf::from("modes/ultra.json")
        );
    }

    #[test]
    fn test_explicit_extension_is_preserved() {
        assert_eq!(
            file_name_for("notes.txt", DOCUMENT_EXTENSION).unwrap(),
            PathBuf::from("notes.txt")
        );
        assert_eq!(
            file_name_for("history.json", LOG_EXTENSION).unwrap(),
            PathBuf::from("history.json")
        );
    }

    #[test]
    fn test_names_outside_state_dir_are_rejected() {
        for name in ["/etc/passwd", "../escape", "modes/../../escape", "", ".", "./"] {
            let result = file_name_for(name, DOCUMENT_EXTENSION);
            assert!(
                matches!(result, Err(AppError::State(_))),
                "{:?} should be rejected",
                name
            );
        }

        assert!(file_name_for("./session", DOCUMENT_EXTENSION).is_ok());
    }

    #[test]
    fn test_local_state_dir() {
        let dir = local_state_dir(Path::new("/project"));
        assert_eq!(dir, PathBuf::from("/project/.keyhook/state"));
    }

    #[test]
    fn test_location_parse_and_display() {
        assert_eq!("Global".parse::<StateLocation>().unwrap(), StateLocation::Global);
        assert_eq!("local".parse::<StateLocation>().unwrap(), StateLocation::Local);
        assert!("remote".parse::<StateLocation>().is_err());
        assert_eq!(StateLocation::Global.to_string(), "global");
    }
}
