//! Utility module for common functionality
//!
//! This module provides small helpers used across the EduPulse SDK.

use once_cell::sync::Lazy;
use regex::Regex;

static SENSITIVE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"phone=[^&\s]+", "phone=[REDACTED]"),
        (r"\+\d[\d\s-]{8,}\d", "[PHONE]"),
        (r"\b\d[\d ]{8,}\d\b", "[PHONE]"),
        (r"Bearer [A-Za-z0-9\-_.]+", "Bearer [REDACTED]"),
        (r"api[_-]?key[=:]\s*[A-Za-z0-9\-_]+", "api_key=[REDACTED]"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Truncate a string to at most `max_chars` characters, adding an ellipsis
/// if truncated
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }

    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }

    let head: String = s.chars().take(max_chars - 3).collect();
    format!("{}...", head)
}

/// Sanitize a string for logging (phone numbers and credentials)
pub fn sanitize_for_logging(s: &str) -> String {
    SENSITIVE_PATTERNS
        .iter()
        .fold(s.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hi", 2), "hi");
        assert_eq!(truncate_string("गणित की कक्षा", 5), "गण...");
    }

    #[test]
    fn test_sanitize_for_logging() {
        let output = sanitize_for_logging("Teacher +91 98765 43210 asked about fractions");
        assert_eq!(output, "Teacher [PHONE] asked about fractions");

        let output = sanitize_for_logging("GET /lookup?phone=+919876543210&topic=x");
        assert!(!output.contains("9876543210"));
        assert!(output.contains("topic=x"));

        let output = sanitize_for_logging("call 9876543210 today");
        assert_eq!(output, "call [PHONE] today");
    }

    #[test]
    fn test_sanitize_keeps_dates() {
        let url = "GET /api/diet/aggregate?date_from=2026-10-16&date_to=2026-12-31";
        assert_eq!(sanitize_for_logging(url), url);

        let line = "Flagged query mock-query-2 at 2026-10-16 09:30";
        assert_eq!(sanitize_for_logging(line), line);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }
}
