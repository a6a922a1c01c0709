//! Error classification and message normalization
//!
//! Every failed backend call ends up here: the status decides whether the
//! failure is retried, and the server payload (when it has a recognizable
//! shape) decides the message shown to the user.

use serde_json::Value;

use super::ServiceError;

/// Message surfaced when no response was received
pub const NETWORK_ERROR_MESSAGE: &str = "Network error — cannot reach server";

/// Message surfaced for validation failures without a usable payload
pub const FRIENDLY_VALIDATION_MESSAGE: &str =
    "We need a little more info — please add the subject or a short example.";

/// How a failed call is treated by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No response, or a gateway status: retried
    Transient,
    /// 400 or 422: not retried, message taken from the payload
    Validation,
    /// Anything else: not retried
    Unclassified,
}

/// Classify a failed call
pub fn classify(error: &ServiceError) -> ErrorClass {
    if error.is_transient() {
        return ErrorClass::Transient;
    }

    match error.status_code() {
        Some(status) if is_validation_status(status) => ErrorClass::Validation,
        _ => ErrorClass::Unclassified,
    }
}

/// Gateway statuses that are worth retrying
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 502 | 503 | 504)
}

/// Statuses whose payload describes a rejected request
pub fn is_validation_status(status: u16) -> bool {
    matches!(status, 400 | 422)
}

/// Produce the user-facing message for a failed call
pub fn normalize_error(error: &ServiceError) -> String {
    if error.is_no_response() {
        return NETWORK_ERROR_MESSAGE.to_string();
    }

    let status = match error.status_code() {
        Some(status) => status,
        None => return error.root().to_string(),
    };

    let payload = error.payload();

    match status {
        422 => payload
            .and_then(unprocessable_message)
            .unwrap_or_else(|| FRIENDLY_VALIDATION_MESSAGE.to_string()),
        400 => payload
            .and_then(|p| {
                string_field(p, "error_message").or_else(|| p.get("detail").map(display_value))
            })
            .unwrap_or_else(|| FRIENDLY_VALIDATION_MESSAGE.to_string()),
        _ => payload
            .and_then(server_message)
            .unwrap_or_else(|| format!("Request failed with status code {}", status)),
    }
}

/// Extract the message from a 422 payload
fn unprocessable_message(payload: &Value) -> Option<String> {
    if let Some(message) = string_field(payload, "error_message") {
        return Some(message);
    }

    match payload.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other
                        .get("msg")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| other.to_string()),
                })
                .collect();

            // Missing narrative or cluster fields get the friendly prompt
            if messages.iter().any(|m| m.contains("text") || m.contains("cluster")) {
                Some(FRIENDLY_VALIDATION_MESSAGE.to_string())
            } else if messages.is_empty() {
                None
            } else {
                Some(messages.join(", "))
            }
        }
        _ => None,
    }
}

/// Extract a message from an arbitrary error payload
fn server_message(payload: &Value) -> Option<String> {
    string_field(payload, "message")
        .or_else(|| payload.get("detail").map(display_value))
        .or_else(|| string_field(payload, "error_message"))
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unprocessable_detail_list() {
        let err = ServiceError::http(
            422,
            Some(json!({"detail": [{"msg": "grade must be a number"}, "language missing"]})),
        );
        assert_eq!(normalize_error(&err), "grade must be a number, language missing");

        let err = ServiceError::http(422, Some(json!({"detail": [{"msg": "field text required"}]})));
        assert_eq!(normalize_error(&err), FRIENDLY_VALIDATION_MESSAGE);
    }

    #[test]
    fn test_bad_request_detail() {
        let err = ServiceError::http(400, Some(json!({"detail": "Topic unknown"})));
        assert_eq!(normalize_error(&err), "Topic unknown");

        let err = ServiceError::http(400, Some(json!(["unexpected"])));
        assert_eq!(normalize_error(&err), FRIENDLY_VALIDATION_MESSAGE);
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(&ServiceError::network("down")), ErrorClass::Transient);
        assert_eq!(classify(&ServiceError::http(504, None)), ErrorClass::Transient);
        assert_eq!(classify(&ServiceError::http(422, None)), ErrorClass::Validation);
        assert_eq!(classify(&ServiceError::http(500, None)), ErrorClass::Unclassified);
        assert_eq!(classify(&ServiceError::parsing("bad json")), ErrorClass::Unclassified);
    }
}
