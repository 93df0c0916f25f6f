//! Configuration management for keyhook.
//!
//! Configuration is resolved fresh on every hook invocation by folding four
//! layers, lowest precedence first:
//! - Built-in defaults
//! - User file (`$XDG_CONFIG_HOME/keyhook/config.jsonc`)
//! - Project file (`<cwd>/.keyhook/config.jsonc`)
//! - Environment variables (`KEYHOOK_*`)
//!
//! A layer that is missing or fails to parse contributes nothing; resolution
//! itself never fails.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::jsonc;

/// Directory name used under the project root and the user config dir.
pub const PROJECT_DIR_NAME: &str = ".keyhook";

/// Application directory name under `$XDG_CONFIG_HOME`.
pub const APP_NAME: &str = "keyhook";

/// Config file name in both the user and project locations.
pub const CONFIG_FILE_NAME: &str = "config.jsonc";

/// `features.sessionStartContext`
pub const ENV_SESSION_START_CONTEXT: &str = "KEYHOOK_SESSION_START_CONTEXT";

/// `features.magicKeywords`
pub const ENV_MAGIC_KEYWORDS: &str = "KEYHOOK_MAGIC_KEYWORDS";

/// `permissions.maxBackgroundTasks`
pub const ENV_MAX_BACKGROUND_TASKS: &str = "KEYHOOK_MAX_BACKGROUND_TASKS";

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub features: Features,

    pub permissions: Permissions,

    /// Keyword name -> replacement trigger phrases
    pub magic_keywords: BTreeMap<String, Vec<String>>,
}

/// Feature toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    /// Inject context when a session starts
    pub session_start_context: bool,

    /// Run keyword detection on submitted prompts
    pub magic_keywords: bool,
}

/// Resource limits handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub max_background_tasks: u32,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            session_start_context: true,
            magic_keywords: true,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            max_background_tasks: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            features: Features::default(),
            permissions: Permissions::default(),
            magic_keywords: BTreeMap::new(),
        }
    }
}

/// One partial layer of configuration.
///
/// Every field is optional. A key that is absent or explicitly `null`
/// deserializes to `None` and inherits from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeaturesLayer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsLayer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_keywords: Option<BTreeMap<String, Option<Vec<String>>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_start_context: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_keywords: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_background_tasks: Option<u32>,
}

impl Config {
    /// Return a new configuration with `layer` merged on top of `self`.
    ///
    /// Sections merge field by field. Each `magicKeywords` entry replaces the
    /// entry of the same name wholesale; trigger lists are never concatenated.
    pub fn merged(&self, layer: &ConfigLayer) -> Config {
        let mut result = self.clone();

        if let Some(features) = &layer.features {
            if let Some(value) = features.session_start_context {
                result.features.session_start_context = value;
            }
            if let Some(value) = features.magic_keywords {
                result.features.magic_keywords = value;
            }
        }

        if let Some(permissions) = &layer.permissions {
            if let Some(value) = permissions.max_background_tasks {
                result.permissions.max_background_tasks = value;
            }
        }

        if let Some(magic_keywords) = &layer.magic_keywords {
            for (name, triggers) in magic_keywords {
                if let Some(triggers) = triggers {
                    result.magic_keywords.insert(name.clone(), triggers.clone());
                }
            }
        }

        result
    }
}

/// Where each configuration layer comes from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub user_file: Option<PathBuf>,
    pub project_file: Option<PathBuf>,
    pub env: ConfigLayer,
}

impl ConfigSources {
    /// Discover sources for `cwd` from the real process environment.
    pub fn discover(cwd: &Path) -> Self {
        Self::from_env(cwd, |key| std::env::var(key).ok())
    }

    /// Discover sources for `cwd`, reading environment values via `lookup`.
    ///
    /// This is the only place configuration consults the environment.
    pub fn from_env<F>(cwd: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_home = lookup("XDG_CONFIG_HOME")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        Self {
            user_file: config_home.map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME)),
            project_file: Some(project_config_path(cwd)),
            env: env_layer_from(lookup),
        }
    }
}

/// Path of the project-scope config file under `cwd`.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Build the environment layer from `lookup`.
///
/// Booleans are true only for the exact string `"true"`. Integers that do
/// not parse are ignored with a warning.
pub fn env_layer_from<F>(lookup: F) -> ConfigLayer
where
    F: Fn(&str) -> Option<String>,
{
    let mut layer = ConfigLayer::default();

    let session_start_context = lookup(ENV_SESSION_START_CONTEXT).map(|v| v == "true");
    let magic_keywords = lookup(ENV_MAGIC_KEYWORDS).map(|v| v == "true");
    if session_start_context.is_some() || magic_keywords.is_some() {
        layer.features = Some(FeaturesLayer {
            session_start_context,
            magic_keywords,
        });
    }

    if let Some(raw) = lookup(ENV_MAX_BACKGROUND_TASKS) {
        match raw.trim().parse::<u32>() {
            Ok(value) => {
                layer.permissions = Some(PermissionsLayer {
                    max_background_tasks: Some(value),
                });
            }
            Err(e) => {
                tracing::warn!("Ignoring {}={:?}: {}", ENV_MAX_BACKGROUND_TASKS, raw, e);
            }
        }
    }

    layer
}

impl ConfigLayer {
    /// Extract a layer from an untyped document, field by field.
    ///
    /// A field with the wrong type is dropped with a warning; the rest of
    /// the document still applies. A non-object document yields an empty
    /// layer.
    pub fn from_value(value: &Value) -> ConfigLayer {
        let Some(root) = value.as_object() else {
            tracing::warn!("Ignoring config layer: top level is not an object");
            return ConfigLayer::default();
        };

        let features = section(root, "features").map(|features| FeaturesLayer {
            session_start_context: field(features, "sessionStartContext", "features"),
            magic_keywords: field(features, "magicKeywords", "features"),
        });

        let permissions = section(root, "permissions").map(|permissions| PermissionsLayer {
            max_background_tasks: field(permissions, "maxBackgroundTasks", "permissions"),
        });

        let magic_keywords = section(root, "magicKeywords").map(|entries| {
            entries
                .keys()
                .map(|name| {
                    let triggers: Option<Vec<String>> = field(entries, name, "magicKeywords");
                    (name.clone(), triggers)
                })
                .collect::<BTreeMap<_, _>>()
        });

        ConfigLayer {
            features,
            permissions,
            magic_keywords,
        }
    }
}

/// Object-valued section `key` of `root`; `null` or absent is `None`.
fn section<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    match root.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            tracing::warn!("Ignoring config section {}: expected an object, got {}", key, other);
            None
        }
    }
}

/// Typed field `key` of `map`; `null`, absent and mistyped values are `None`.
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, section: &str) -> Option<T> {
    let value = map.get(key).filter(|value| !value.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring config field {}.{}: {}", section, key, e);
            None
        }
    }
}

/// Load one file layer.
///
/// Missing or unparseable files contribute nothing. In a parseable file only
/// the mistyped fields are dropped.
pub fn load_layer(path: &Path) -> ConfigLayer {
    match jsonc::read_file::<Value>(path) {
        Ok(Some(value)) => {
            tracing::debug!("Loaded config layer from {:?}", path);
            ConfigLayer::from_value(&value)
        }
        Ok(None) => ConfigLayer::default(),
        Err(e) => {
            tracing::warn!("Skipping config layer: {}", e);
            ConfigLayer::default()
        }
    }
}

/// Resolve the active configuration for `cwd`.
///
/// # Example
/// ```no_run
/// use keyhook_core::config::resolve;
/// use std::path::Path;
///
/// let config = resolve(Path::new("."));
/// println!("keywords enabled: {}", config.features.magic_keywords);
/// ```
pub fn resolve(cwd: &Path) -> Config {
    resolve_with(&ConfigSources::discover(cwd))
}

/// Resolve configuration from explicit sources.
pub fn resolve_with(sources: &ConfigSources) -> Config {
    let file_layers = [&sources.user_file, &sources.project_file]
        .into_iter()
        .flatten()
        .map(|path| load_layer(path));

    file_layers
        .chain(std::iter::once(sources.env.clone()))
        .fold(Config::default(), |config, layer| config.merged(&layer))
}

/// Deep-merge two untyped JSON documents without touching either input.
///
/// Objects merge recursively. Any other override value replaces the base
/// value at that key, including `null`, arrays and type mismatches. Keys
/// missing from the override keep their base value.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in overlay_map {
                let next = match merged.get(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}
