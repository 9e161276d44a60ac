//! Validation for the relay server list.

use crate::schema::HuddleConfig;

const ICE_SCHEMES: [&str; 4] = ["stun:", "stuns:", "turn:", "turns:"];

pub(crate) fn validate_ice_servers(errors: &mut Vec<String>, config: &HuddleConfig) {
    for (i, server) in config.ice_servers.iter().enumerate() {
        if server.urls.is_empty() {
            errors.push(format!("ice_servers[{i}] has no urls"));
        }
        for url in &server.urls {
            if !ICE_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
                errors.push(format!(
                    "ice_servers[{i}] url {url:?} must start with stun:, stuns:, turn: or turns:"
                ));
            }
        }
    }
}
