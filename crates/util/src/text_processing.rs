//! Redaction of credentials in text destined for logs.

use once_cell::sync::Lazy;
use regex::Regex;

const REPLACEMENT: &str = "[REDACTED]";

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)([^\s]+(?:\s+[^\s]+)*)",
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
        r"(?i)([A-Z0-9_]*(?:API_KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        r#"(?i)("api[-_]?key"\s*:\s*")([^"]*)(")"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Key names and header names are preserved so the redacted text stays useful
/// for debugging.
///
/// ```rust
/// use actrun_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("ACTRUN_API_KEY=abc123"), "ACTRUN_API_KEY=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REPLACEMENT}{suffix}")
            })
            .to_string();
    }
    redacted
}
