//! Core TOML config loading: read from path or platform default.

use crate::schema::HuddleConfig;
use crate::validation;
use huddle_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::template::write_default_config;

/// `<config dir>/huddle/signal.toml`, or `None` on platforms without a
/// per-user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("huddle").join("signal.toml"))
}

/// Load config from a specific TOML file path.
///
/// Missing fields take serde defaults. A validation failure is logged as a
/// warning and the parsed config is returned as-is; callers that must not
/// start with bad values run [`validation::validate`] themselves.
pub fn load_from_path(path: &Path) -> Result<HuddleConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: HuddleConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/huddle/signal.toml`
///
/// A missing file is seeded with the commented template and defaults are
/// returned. Without a config directory at all (e.g. a bare container user)
/// the defaults are used and nothing is written.
pub fn load_default() -> Result<HuddleConfig, ConfigError> {
    let Some(path) = default_config_path() else {
        warn!("no config directory on this platform, using defaults");
        return Ok(HuddleConfig::default());
    };

    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, writing template", path.display());
            write_default_config(&path)?;
            Ok(HuddleConfig::default())
        }
        other => other,
    }
}
