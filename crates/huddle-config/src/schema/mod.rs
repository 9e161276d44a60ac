//! Configuration schema types for the signaling server.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod ice;
mod limits;
mod logging;
mod server;

pub use ice::*;
pub use limits::*;
pub use logging::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub ice_servers: Vec<IceServerConfig>,
    pub logging: LoggingConfig,
}

impl Default for HuddleConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limits: LimitsConfig::default(),
            ice_servers: default_ice_servers(),
            logging: LoggingConfig::default(),
        }
    }
}
