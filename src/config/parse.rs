//! Environment variable parsing utilities.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse environment variable as boolean.
/// Treats "1", "true" (case-insensitive) as true.
pub fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(default)
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v.parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Seconds per duration unit suffix.
const UNITS: [(char, u64); 6] = [
    ('s', 1),
    ('m', 60),
    ('h', 3_600),
    ('d', 86_400),
    ('w', 604_800),
    ('y', 31_536_000),
];

/// Parse a lifetime such as `"30s"`, `"10d"` or a bare number of seconds.
///
/// `"off"`, `"0"` and the empty string mean no lifetime.
pub fn parse_duration(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();
    if s.is_empty() || s == "off" || s == "0" {
        return Ok(None);
    }

    let (digits, multiplier) = match s.chars().last().and_then(|c| {
        UNITS
            .iter()
            .find(|(unit, _)| *unit == c)
            .map(|(_, secs)| (&s[..s.len() - 1], *secs))
    }) {
        Some(split) => split,
        None => (s.as_str(), 1),
    };

    let count: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration: {}", s))?;
    count
        .checked_mul(multiplier)
        .map(|secs| Some(Duration::from_secs(secs)))
        .ok_or_else(|| format!("duration out of range: {}", s))
}

/// Parse environment variable as duration.
pub fn env_duration(key: &str, default: &str) -> Result<Option<Duration>, ConfigError> {
    let value = env_or(key, default);
    parse_duration(&value).map_err(|e| ConfigError::Parse {
        key: key.into(),
        value,
        error: e,
    })
}
