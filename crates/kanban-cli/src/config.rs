//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for kanban
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Streaming chat endpoint
    pub chat_url: Option<String>,
    /// Bearer token sent with chat requests
    pub api_key: Option<String>,
    /// Owner of the board and chat history
    pub user_id: Option<String>,
    /// Where tasks and history are stored
    pub data_dir: Option<String>,
    /// Persisted messages loaded at startup
    pub history_limit: Option<usize>,
    /// Parse attempts for a malformed stream line before it is dropped
    pub max_reparse_attempts: Option<u32>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanban")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("KANBAN_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default path
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            chat_url: Some("http://localhost:54321/functions/v1/chat".to_string()),
            user_id: Some("local".to_string()),
            history_limit: Some(kanban_chat::DEFAULT_HISTORY_LIMIT),
            max_reparse_attempts: Some(kanban_ai::DEFAULT_MAX_PARSE_ATTEMPTS),
            ..Default::default()
        };

        default_config.save_to(&path)?;
        Ok(path)
    }

    /// Chat endpoint: flag, then `KANBAN_CHAT_URL`, then the file
    pub fn chat_url(&self, flag: Option<String>) -> Option<String> {
        resolve(flag, std::env::var("KANBAN_CHAT_URL").ok(), self.chat_url.clone())
    }

    /// API key: flag, then `KANBAN_API_KEY`, then the file
    pub fn api_key(&self, flag: Option<String>) -> Option<String> {
        resolve(flag, std::env::var("KANBAN_API_KEY").ok(), self.api_key.clone())
    }

    pub fn user_id(&self, flag: Option<String>) -> String {
        resolve(flag, None, self.user_id.clone()).unwrap_or_else(|| "local".to_string())
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("kanban"),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
            .unwrap_or(kanban_chat::DEFAULT_HISTORY_LIMIT)
    }

    pub fn max_reparse_attempts(&self) -> u32 {
        self.max_reparse_attempts
            .unwrap_or(kanban_ai::DEFAULT_MAX_PARSE_ATTEMPTS)
    }
}

/// First non-blank value wins
fn resolve(flag: Option<String>, env: Option<String>, file: Option<String>) -> Option<String> {
    [flag, env, file]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# kanban configuration file
# Place at ~/.config/kanban/config.toml (Linux/Mac) or %APPDATA%\kanban\config.toml (Windows)

# Streaming chat endpoint (overridden by KANBAN_CHAT_URL or --url)
chat_url = "http://localhost:54321/functions/v1/chat"

# Bearer token for the endpoint (overridden by KANBAN_API_KEY or --api-key)
# api_key = "..."

# Board owner; tasks and chat history are kept per user
user_id = "local"

# Storage directory (defaults to the platform data directory)
# data_dir = "~/.local/share/kanban"

# Chat messages loaded at startup
history_limit = 50

# Times a malformed stream line is re-parsed before it is dropped
max_reparse_attempts = 3
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kanban-config-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load_from(&temp_path("config.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.history_limit(), 50);
        assert_eq!(config.max_reparse_attempts(), 3);
        assert_eq!(config.user_id(None), "local");
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("config.toml");
        let config = Config {
            chat_url: Some("https://example.com/chat".into()),
            user_id: Some("alice".into()),
            history_limit: Some(10),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_unparseable_file_falls_back() {
        let path = temp_path("config.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "history_limit = \"lots\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.history_limit, Some(50));
        assert_eq!(config.max_reparse_attempts, Some(3));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_resolve_precedence() {
        let some = |s: &str| Some(s.to_string());
        assert_eq!(resolve(some("flag"), some("env"), some("file")), some("flag"));
        assert_eq!(resolve(None, some("env"), some("file")), some("env"));
        assert_eq!(resolve(None, some(" "), some("file")), some("file"));
        assert_eq!(resolve(None, None, None), None);
    }
}
