//! Default TOML config template with inline documentation comments.

use std::path::Path;

use huddle_common::ConfigError;

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Huddle signaling server configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind = "0.0.0.0"
# port = 8080                    # 1-65535
# path_prefix = "/ws/voice"      # clients connect to {path_prefix}/{room_id}

[limits]
# max_peers_per_room = 8         # 2-64
# max_rooms = 20                 # 1-10000
# room_id_max_len = 64           # 1-256
# display_name_max_len = 64      # 1-256
# stale_timeout_secs = 120       # 10-3600
# reap_interval_secs = 60        # 1-3600, <= stale_timeout_secs
# idle_ping_secs = 30            # 1-3600, < stale_timeout_secs
# send_queue_capacity = 256      # 8-65536

# Relay servers handed to clients in `room_joined`. Repeat the table for
# additional entries.
[[ice_servers]]
urls = ["stun:stun.l.google.com:19302"]
# username = "user"
# credential = "secret"

[logging]
# level = "info"                 # trace, debug, info, warn, error
"##
    .to_string()
}

/// Write the documented template to `path`, creating missing directories.
/// An existing file is left alone.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    let write = || -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, default_config_toml())
    };
    write().map_err(|e| {
        ConfigError::ParseError(format!("cannot write default config {}: {e}", path.display()))
    })
}
