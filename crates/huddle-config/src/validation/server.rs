//! Validation for the `[server]` section.

use crate::schema::HuddleConfig;

use super::helpers::validate_range;

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &HuddleConfig) {
    validate_range(errors, "server.port", config.server.port, 1, 65535);

    if config.server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }

    let prefix = &config.server.path_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(format!(
            "server.path_prefix = {prefix:?} must start with '/' and not end with '/'"
        ));
    }
}
