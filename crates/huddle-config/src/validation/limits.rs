//! Validation for capacity and liveness limits.

use crate::schema::HuddleConfig;

use super::helpers::validate_range;

pub(crate) fn validate_limits(errors: &mut Vec<String>, config: &HuddleConfig) {
    let limits = &config.limits;
    validate_range(
        errors,
        "limits.max_peers_per_room",
        limits.max_peers_per_room,
        2,
        64,
    );
    validate_range(errors, "limits.max_rooms", limits.max_rooms, 1, 10_000);
    validate_range(errors, "limits.room_id_max_len", limits.room_id_max_len, 1, 256);
    validate_range(
        errors,
        "limits.display_name_max_len",
        limits.display_name_max_len,
        1,
        256,
    );
    validate_range(
        errors,
        "limits.stale_timeout_secs",
        limits.stale_timeout_secs,
        10,
        3600,
    );
    validate_range(
        errors,
        "limits.reap_interval_secs",
        limits.reap_interval_secs,
        1,
        3600,
    );
    validate_range(errors, "limits.idle_ping_secs", limits.idle_ping_secs, 1, 3600);
    validate_range(
        errors,
        "limits.send_queue_capacity",
        limits.send_queue_capacity,
        8,
        65_536,
    );

    if limits.reap_interval_secs > limits.stale_timeout_secs {
        errors.push(format!(
            "limits.reap_interval_secs ({}) must not exceed limits.stale_timeout_secs ({})",
            limits.reap_interval_secs, limits.stale_timeout_secs
        ));
    }
    if limits.idle_ping_secs >= limits.stale_timeout_secs {
        errors.push(format!(
            "limits.idle_ping_secs ({}) must be below limits.stale_timeout_secs ({})",
            limits.idle_ping_secs, limits.stale_timeout_secs
        ));
    }
}
