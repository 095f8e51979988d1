//! Environment variable helpers for credential discovery.

/// Non-empty environment variable.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `true` for "1" or "true" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// First set variable among `keys`.
pub fn env_with_fallbacks(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env_opt(key))
}
