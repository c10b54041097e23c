use std::{env, path::PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Version given to a service's type set when none is configured.
pub const DEFAULT_TYPE_SET_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Overrides the service identifier chosen by the embedding application.
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default = "default_type_set_version")]
    pub type_set_version: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            type_set_version: default_type_set_version(),
        }
    }
}

impl RegistryConfig {
    /// Loads the configuration file; a missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(config) = serde_json::from_str(&content)
        {
            debug!(path = %path.display(), "registry config loaded");
            return config;
        }
        RegistryConfig::default()
    }
}

fn default_type_set_version() -> String {
    DEFAULT_TYPE_SET_VERSION.to_string()
}

/// Get the default path for the registry configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var("LOOM_CONFIG_PATH")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("loom")
        .join("registry.json")
}
