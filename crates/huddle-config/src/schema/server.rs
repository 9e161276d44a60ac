use serde::{Deserialize, Serialize};

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind: String,
    pub port: u32,
    /// Path prefix for the signaling endpoint; the room id follows it.
    pub path_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            path_prefix: "/ws/voice".into(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` string suitable for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
