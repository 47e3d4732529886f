use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    /// Gemini API key used for diagnosis completions.
    gemini_api_key: String,
    /// SQLite file for consultation records.
    database_path: Option<String>,
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_port")]
    port: u16,
    /// How many consultations a history request returns.
    #[serde(default = "default_history_limit")]
    history_limit: usize,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_history_limit() -> usize {
    3
}

pub struct Config {
    pub gemini_api_key: String,
    pub database_path: PathBuf,
    pub bind: String,
    pub port: u16,
    pub history_limit: usize,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.gemini_api_key.is_empty() {
            return Err(ConfigError::Validation("gemini_api_key is required".into()));
        }
        if file.history_limit == 0 {
            return Err(ConfigError::Validation("history_limit must be at least 1".into()));
        }

        let database_path = file
            .database_path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("medical.db"));

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            gemini_api_key: file.gemini_api_key,
            database_path,
            bind: file.bind,
            port: file.port,
            history_limit: file.history_limit,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(r#"{
            "gemini_api_key": "AIzaTestKey"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.gemini_api_key, "AIzaTestKey");
        assert_eq!(config.database_path, PathBuf::from("medical.db"));
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.history_limit, 3);
    }

    #[test]
    fn test_overrides() {
        let file = write_config(r#"{
            "gemini_api_key": "AIzaTestKey",
            "database_path": "/tmp/consults.db",
            "bind": "127.0.0.1",
            "port": 8080,
            "history_limit": 5
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/consults.db"));
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn test_empty_api_key() {
        let file = write_config(r#"{
            "gemini_api_key": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("gemini_api_key"));
    }

    #[test]
    fn test_zero_history_limit() {
        let file = write_config(r#"{
            "gemini_api_key": "AIzaTestKey",
            "history_limit": 0
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("history_limit"));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }
}
