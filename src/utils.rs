// Utility functions
use chrono::{DateTime, Utc};

/// Converts a unix-seconds string (as used in trends timelines) into `DateTime<Utc>`.
pub fn parse_unix_timestamp(secs: &str) -> Option<DateTime<Utc>> {
    secs.trim()
        .parse::<i64>()
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Converts a string to kebab-case, keeping only alphanumerics.
pub fn to_kebab_case(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// File-name stem for a series name. Names that lose characters in kebab-case
/// (e.g. `C++` vs `C`) or reduce to nothing get a hash suffix of the original text.
pub fn file_stem(text: &str) -> String {
    let kebab = to_kebab_case(text);
    let lossy = text
        .chars()
        .any(|c| !(c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '_'));
    match (kebab.is_empty(), lossy) {
        (true, _) => format!("series-{:08x}", fnv1a(text)),
        (false, true) => format!("{}-{:08x}", kebab, fnv1a(text)),
        (false, false) => kebab,
    }
}

// 32-bit FNV-1a; stable across runs and platforms
fn fnv1a(text: &str) -> u32 {
    text.bytes()
        .fold(0x811c_9dc5u32, |hash, b| (hash ^ b as u32).wrapping_mul(0x0100_0193))
}

/// Drops the anti-XSSI junk in front of a trends API JSON body.
pub fn strip_json_prefix(body: &str) -> &str {
    match body.find('{') {
        Some(start) => &body[start..],
        None => body,
    }
}

/// Formats a descriptor cell; undefined values render as `NaN`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.4}", value)
    }
}
