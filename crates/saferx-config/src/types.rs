use crate::manager::ConfigError;
use saferx_core::SafetyLimits;
use saferx_engine::{CacheSettings, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Main configuration structure for saferx
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaferxConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: String,

    /// Limits applied by `saferx check` and by callers that load this file
    #[serde(default)]
    pub limits: SafetyLimits,

    /// Cache sizing for the analyzer
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for SaferxConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            limits: SafetyLimits::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl SaferxConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.ttl_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache settings for `Analyzer::with_settings`.
    pub fn cache_settings(&self) -> Result<CacheSettings, ConfigError> {
        self.validate()?;
        let capacity = NonZeroUsize::new(self.cache.capacity).ok_or_else(|| {
            ConfigError::Invalid("cache.capacity must be at least 1".to_string())
        })?;
        Ok(CacheSettings {
            capacity,
            ttl: Duration::from_secs(self.cache.ttl_secs),
        })
    }
}

/// Cache section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Maximum distinct entries per cache
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Seconds after last access before an entry expires
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

// Default value functions
fn default_version() -> String {
    "1.0".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}
