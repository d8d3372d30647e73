//! Field readers for the `{success, message, data, error}` JSON envelope
//! spoken by both the backend and the browser-facing routes.

use serde_json::Value;

/// The backend's `error` field, or `fallback`.
pub fn error_or(body: &Value, fallback: &str) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// The backend's `error` field, then `message`, then `fallback`.
pub fn error_or_message(body: &Value, fallback: &str) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| body.get("message").and_then(Value::as_str).filter(|s| !s.is_empty()))
        .unwrap_or(fallback)
        .to_string()
}

/// `body.success == true`
pub fn is_success(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_prefers_error_field() {
        let body = json!({"error": "Job closed", "message": "ignored"});
        assert_eq!(error_or_message(&body, "fallback"), "Job closed");
        assert_eq!(error_or(&body, "fallback"), "Job closed");
    }

    #[test]
    fn test_message_used_when_no_error() {
        let body = json!({"message": "Too many attempts"});
        assert_eq!(error_or_message(&body, "fallback"), "Too many attempts");
        assert_eq!(error_or(&body, "fallback"), "fallback");
    }

    #[test]
    fn test_is_success() {
        assert!(is_success(&json!({"success": true})));
        assert!(!is_success(&json!({"success": "yes"})));
        assert!(!is_success(&Value::Null));
    }
}
