//! Huddle signaling configuration.
//!
//! TOML-based configuration with full validation. All sections use
//! sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use huddle_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("listening on {}", config.server.listen_addr());
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    HuddleConfig, IceServerConfig, LimitsConfig, LogLevel, LoggingConfig, ServerConfig,
    CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use huddle_common::ConfigError;

/// Load config from `path`, or from the platform default when `None`,
/// and reject it if any value is out of range.
pub fn load_config(path: Option<&Path>) -> Result<HuddleConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &HuddleConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
