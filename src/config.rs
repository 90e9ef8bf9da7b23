use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::DchatError;
use crate::discussion::{DEFAULT_MODEL, DEFAULT_TOKEN_LIMIT};

/// Name of the environment variable holding the API credential. Missing
/// at startup is fatal before the REPL starts.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model for newly created discussions
    pub model: String,
    /// Default token limit for newly created discussions
    pub token_limit: usize,
    /// Override for the chat-completion endpoint base URL
    pub base_url: Option<String>,
    /// Override for the discussion record directory
    pub storage_dir: Option<PathBuf>,
    /// Skip y/N prompts on destructive commands
    pub auto_confirm: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            token_limit: DEFAULT_TOKEN_LIMIT,
            base_url: None,
            storage_dir: None,
            auto_confirm: false,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dchat")
}

fn config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

pub fn input_history_path() -> PathBuf {
    config_dir().join("input_history.txt")
}

impl Config {
    /// Loads the config file, writing one with defaults on first run.
    pub fn load() -> Result<Config, DchatError> {
        let path = config_path();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config = serde_yml::from_str::<Config>(&contents)
                .map_err(|e| DchatError::Config(format!("Parse {}: {}", path.display(), e)))?;
            return Ok(config);
        }

        let config = Config::default();
        let _ = config.save();
        Ok(config)
    }

    pub fn save(&self) -> Result<(), DchatError> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(&path, yaml_content)?;
        Ok(())
    }

    /// Where discussion records live, unless overridden on the command line.
    pub fn discussions_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| config_dir().join("discussions"))
    }

    /// Reads the API credential from the environment.
    pub fn api_key() -> Result<String, DchatError> {
        env::var(API_KEY_ENV).map_err(|_| {
            DchatError::Config(format!(
                "{} is not set. Export your API key: export {}=<key>",
                API_KEY_ENV, API_KEY_ENV
            ))
        })
    }
}
