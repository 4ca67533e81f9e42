//! Environment helpers shared by the configuration layers

/// Read a non-empty environment variable
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a boolean flag from the environment
///
/// Accepts `1`, `true`, `yes` and `on` (case-insensitive) as true. Anything
/// else, including an unset variable, yields `default`.
pub fn env_flag(name: &str, default: bool) -> bool {
    env_var(name).map_or(default, |value| parse_flag(&value).unwrap_or(default))
}

/// Read and parse a numeric environment variable
pub fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|value| value.parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
