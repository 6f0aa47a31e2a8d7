use crate::error::{DbxError, Result};
use crate::utils::fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TOKEN_ENV_VAR: &str = "DROPBOX_ACCESS_TOKEN";
pub const DEFAULT_API_URL: &str = "https://api.dropboxapi.com/2";
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com/2";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_content_url")]
    pub content_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_content_url() -> String {
    DEFAULT_CONTENT_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            access_token: None,
            api_url: default_api_url(),
            content_url: default_content_url(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Read the config at `path`, writing a default one if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "creating default config");
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            DbxError::config_error(format!("{} is not valid: {e}", path.display()))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::ensure_dir_exists(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        fs::restrict_to_owner(path)?;

        Ok(())
    }

    /// Access token from the environment, falling back to the stored one.
    pub fn resolve_token(&self) -> Option<String> {
        token_from(std::env::var(TOKEN_ENV_VAR).ok(), self.access_token.clone())
    }

    pub fn set_access_token(&mut self, token: String) -> Result<()> {
        self.access_token = Some(token);
        self.save()
    }
}

fn token_from(env: Option<String>, stored: Option<String>) -> Option<String> {
    env.into_iter()
        .chain(stored)
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

fn get_dbxcli_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".dbxcli"))
        .ok_or(DbxError::HomeDirectoryNotFound)
}

fn get_config_path() -> Result<PathBuf> {
    Ok(get_dbxcli_dir()?.join("config.json"))
}
