use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::identity::DEFAULT_KEY_ROUNDS;

pub const DEFAULT_WATCHER_CAPACITY: usize = 256;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_key_rounds")]
    pub key_derivation_rounds: u32,
    #[serde(default = "default_watcher_capacity")]
    pub watcher_capacity: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_rounds() -> u32 {
    DEFAULT_KEY_ROUNDS
}

fn default_watcher_capacity() -> usize {
    DEFAULT_WATCHER_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            key_derivation_rounds: DEFAULT_KEY_ROUNDS,
            watcher_capacity: DEFAULT_WATCHER_CAPACITY,
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from `path`, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: &str) -> Self {
        if !std::path::Path::new(path).exists() {
            info!("Config file not found at '{}'. Using defaults.", path);
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(s) => match Self::from_toml_str(&s) {
                Ok(c) => {
                    info!("Config loaded from {}", path);
                    c
                }
                Err(e) => {
                    warn!("Error parsing config: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Error reading config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }
}
