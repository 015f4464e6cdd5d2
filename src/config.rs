//! Bot credentials and owner list, stored as a camelCase JSON file.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Default file name, relative to the working directory.
pub const CONFIG_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub developer_ids: Vec<String>,
    pub token: String,
    pub open_router_api_key: String,
    pub twelve_data_api_key: String,
    pub leetify_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            developer_ids: vec!["-1-1-1".to_string()],
            token: "token".to_string(),
            open_router_api_key: String::new(),
            twelve_data_api_key: String::new(),
            leetify_password: String::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("config is not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads `path`, first writing a default config there if it does not exist.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let io_error = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        if !path.exists() {
            warn!(path = %path.display(), "no config found, writing defaults");
            fs::write(path, Config::default().to_json()?).map_err(io_error)?;
        }

        let config = Config::from_json(&fs::read_to_string(path).map_err(io_error)?)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn is_developer(&self, user_id: &str) -> bool {
        self.developer_ids.iter().any(|id| id == user_id)
    }
}
