use super::Output;
use anyhow::{Context, Result};
use clap::Subcommand;
use saferx_config::{ConfigError, ConfigManager, SaferxConfig};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Initialize config file at ~/.saferx/config.toml (or --config)
    Init,

    /// Print the effective configuration
    Show,

    /// Show config file path
    Path,

    /// Validate config file
    Validate,
}

pub fn handle_config_command(
    cmd: ConfigCommand,
    config_path: Option<&Path>,
    output: Output,
) -> Result<()> {
    match cmd {
        ConfigCommand::Init => init_config(config_path),
        ConfigCommand::Show => show_config(config_path, output),
        ConfigCommand::Path => show_config_path(config_path),
        ConfigCommand::Validate => validate_config(config_path, output),
    }
}

/// Load the config the other commands run with.
///
/// An explicit path must exist. Without one, a missing default file means
/// built-in defaults.
pub fn load_config(config_path: Option<&Path>) -> Result<SaferxConfig> {
    if let Some(path) = config_path {
        let manager = ConfigManager::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        return Ok(manager.config().clone());
    }

    match ConfigManager::load() {
        Ok(manager) => Ok(manager.config().clone()),
        Err(ConfigError::ConfigNotFound(_) | ConfigError::HomeNotFound) => {
            tracing::debug!("no config file, using defaults");
            Ok(SaferxConfig::default())
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ConfigManager::config_path()?),
    }
}

fn init_config(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_path(config_path)?;

    if path.exists() {
        println!("Config already exists at: {}", path.display());
        println!("To reinitialize, please delete the existing config first.");
        return Ok(());
    }

    ConfigManager::init_at(&path)
        .with_context(|| format!("Failed to initialize config at {}", path.display()))?;
    println!("✓ Initialized config at: {}", path.display());
    Ok(())
}

fn show_config(config_path: Option<&Path>, output: Output) -> Result<()> {
    let config = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    output.emit(&config, |_| print!("{toml_str}"))
}

fn show_config_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config_path)?.display());
    Ok(())
}

fn validate_config(config_path: Option<&Path>, output: Output) -> Result<()> {
    let path = resolve_path(config_path)?;
    let manager = ConfigManager::load_from(&path)
        .context("Config not found or invalid. Run 'saferx config init' first.")?;

    let config = manager.config();
    output.emit(config, |config| {
        println!("✓ Config is valid");
        println!("  Version: {}", config.version);
        println!("  Max star height: {}", config.limits.max_star_height);
        println!("  Max repetitions: {}", config.limits.max_repetitions);
        println!(
            "  Backreferences: {}",
            if config.limits.allow_backreferences {
                "allowed"
            } else {
                "rejected"
            }
        );
        println!(
            "  Cache: {} entries, {}s expiry",
            config.cache.capacity, config.cache.ttl_secs
        );
    })
}
