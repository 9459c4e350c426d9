//! Environment variable parsing with warn-level logging for invalid values.

use std::time::Duration;

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Read a string variable, treating blank values as unset.
#[must_use]
pub fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

pub fn env_secs_with_default(var: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_parse_with_default(var, default_secs))
}

pub fn env_millis_with_default(var: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_parse_with_default(var, default_ms))
}
