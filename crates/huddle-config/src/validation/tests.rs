//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

#[test]
fn default_config_validates() {
    let config = HuddleConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_port_zero() {
    let mut config = HuddleConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_port_too_large() {
    let mut config = HuddleConfig::default();
    config.server.port = 70_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_bad_path_prefix() {
    let mut config = HuddleConfig::default();
    config.server.path_prefix = "ws/voice/".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.path_prefix"));
}

#[test]
fn catches_single_peer_rooms() {
    let mut config = HuddleConfig::default();
    config.limits.max_peers_per_room = 1;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("limits.max_peers_per_room"));
}

#[test]
fn catches_zero_rooms() {
    let mut config = HuddleConfig::default();
    config.limits.max_rooms = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("limits.max_rooms"));
}

#[test]
fn catches_reap_interval_longer_than_timeout() {
    let mut config = HuddleConfig::default();
    config.limits.stale_timeout_secs = 30;
    config.limits.reap_interval_secs = 60;
    config.limits.idle_ping_secs = 10;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must not exceed"));
}

#[test]
fn catches_idle_ping_not_below_timeout() {
    let mut config = HuddleConfig::default();
    config.limits.idle_ping_secs = 120;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("limits.idle_ping_secs"));
}

#[test]
fn catches_ice_server_without_urls() {
    let mut config = HuddleConfig::default();
    config.ice_servers.push(IceServerConfig {
        urls: vec![],
        username: None,
        credential: None,
    });
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ice_servers[1] has no urls"));
}

#[test]
fn catches_ice_server_with_http_url() {
    let mut config = HuddleConfig::default();
    config.ice_servers = vec![IceServerConfig::stun("https://example.org")];
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ice_servers[0]"));
}

#[test]
fn empty_ice_server_list_is_allowed() {
    let mut config = HuddleConfig::default();
    config.ice_servers.clear();
    assert!(validate(&config).is_ok());
}

#[test]
fn collects_multiple_errors() {
    let mut config = HuddleConfig::default();
    config.server.port = 0;
    config.limits.max_rooms = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
    assert!(err.contains("limits.max_rooms"));
    assert!(err.contains("; "));
}
