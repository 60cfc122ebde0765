pub mod manager;
pub mod types;

pub use manager::{ConfigError, ConfigManager};
pub use types::{CacheConfig, SaferxConfig};
