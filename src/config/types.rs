use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub handoff: HandoffConfig,

    #[serde(default)]
    pub launch: LaunchConfig,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            config_path: PathBuf::new(),
            log_level: default_log_level(),
            handoff: HandoffConfig::default(),
            launch: LaunchConfig::default(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HandoffBackend {
    /// Process-local; payloads vanish when the process exits.
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandoffConfig {
    #[serde(default)]
    pub backend: HandoffBackend,
    /// Storage file; relative paths resolve against the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}
