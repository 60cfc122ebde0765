use crate::types::SaferxConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Config file already exists at {0}")]
    ConfigExists(PathBuf),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Manager for saferx configuration
///
/// Manages the configuration stored in ~/.saferx/config.toml, or at any
/// explicit path.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: SaferxConfig,
}

impl ConfigManager {
    /// Get the default config path (~/.saferx/config.toml)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".saferx").join("config.toml"))
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from specific path (useful for testing)
    ///
    /// The loaded values are validated before returning.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let config: SaferxConfig = toml::from_str(&contents)?;
        config.validate()?;

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Initialize a new config file at the default location
    pub fn init() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path)
    }

    /// Initialize config at specific path
    ///
    /// Refuses to overwrite an existing file.
    pub fn init_at(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Err(ConfigError::ConfigExists(path.to_path_buf()));
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = Self {
            config_path: path.to_path_buf(),
            config: SaferxConfig::default(),
        };
        manager.save()?;
        Ok(manager)
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub fn save(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        let toml_str = toml::to_string_pretty(&self.config)?;

        // Write to temporary file first
        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, toml_str)?;
        set_config_permissions(&temp_path)?;

        // Atomic rename
        fs::rename(&temp_path, &self.config_path)?;

        tracing::debug!(path = %self.config_path.display(), "saved config");
        Ok(())
    }

    /// Path this manager reads from and saves to
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get reference to config
    pub fn config(&self) -> &SaferxConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut SaferxConfig {
        &mut self.config
    }
}

/// Restrict the config file to its owner (rw-------)
#[cfg(unix)]
fn set_config_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_config_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
