use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub git: GitConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    pub program: String,
    /// Branch name passed to `git init --initial-branch`
    pub initial_branch: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    pub ssh_program: String,
    #[serde(default)]
    pub ssh_options: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SyncConfig {
    pub remote: String,
    pub branch: String,
    pub remote_branch: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    pub log_commands: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("yagit"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Err(ConfigError::ReadError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Config file not found",
            )));
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    pub fn load_from<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when no file exists
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(ConfigError::ReadError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config file found, using defaults");
                Ok(Self::default_config())
            }
            Err(ConfigError::DirectoryNotFound) => Ok(Self::default_config()),
            Err(e) => Err(e),
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)?;
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            git: GitConfig {
                program: "git".to_string(),
                initial_branch: "master".to_string(),
            },
            remote: RemoteConfig {
                ssh_program: "ssh".to_string(),
                ssh_options: Vec::new(),
            },
            sync: SyncConfig {
                remote: "origin".to_string(),
                branch: "master".to_string(),
                remote_branch: "master".to_string(),
            },
            behavior: BehaviorConfig {
                log_commands: false,
                history_path: None,
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("git.program", &self.git.program),
            ("git.initial_branch", &self.git.initial_branch),
            ("remote.ssh_program", &self.remote.ssh_program),
            ("sync.remote", &self.sync.remote),
            ("sync.branch", &self.sync.branch),
            ("sync.remote_branch", &self.sync.remote_branch),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!("{} must not be empty", key)));
            }
        }

        if self.sync.remote.contains('/') {
            return Err(ConfigError::InvalidValue(format!(
                "sync.remote must be a remote name, got '{}'",
                self.sync.remote
            )));
        }

        Ok(())
    }

    /// Path of the command history file, if command logging is on
    pub fn history_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        if !self.behavior.log_commands {
            return Ok(None);
        }

        match &self.behavior.history_path {
            Some(path) => Ok(Some(path.clone())),
            None => Ok(Some(Self::config_dir()?.join("history.log"))),
        }
    }
}
