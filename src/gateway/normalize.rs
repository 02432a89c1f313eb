use serde_json::Value;

use crate::auth::error::{is_known_provider_code, provider_error};
use crate::error::{ClientError, ClientResult};

/// Turns a non-2xx response body into a tagged error.
///
/// Priority: a nested identity-provider code, then `detail`, then `message`,
/// then a generic `Server error (<status>)`.
pub fn normalize_error_response(status: u16, body: &str) -> ClientError {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(code) = nested_provider_code(&value) {
            return provider_error(&code);
        }

        if let Some(detail) = detail_text(&value) {
            if is_known_provider_code(&detail) {
                return provider_error(&detail);
            }
            return ClientError::Server {
                status,
                message: detail,
            };
        }

        if let Some(message) = non_empty_str(value.get("message")) {
            return ClientError::Server {
                status,
                message: message.to_string(),
            };
        }
    }

    ClientError::Server {
        status,
        message: format!("Server error ({status})"),
    }
}

/// Checks the success marker of a 2xx payload.
///
/// An identity-provider code in the body fails the call the same way it does
/// on a non-2xx response. Otherwise payloads without a `status` field pass; a
/// `status` that is neither a success word nor a 2xx number is a domain
/// failure.
pub fn ensure_success(payload: &Value) -> ClientResult<()> {
    if let Some(code) = nested_provider_code(payload) {
        return Err(provider_error(&code));
    }
    if let Some(detail) = detail_text(payload).filter(|detail| is_known_provider_code(detail)) {
        return Err(provider_error(&detail));
    }

    let failed = match payload.get("status") {
        Some(Value::String(status)) => !matches!(
            status.trim().to_ascii_lowercase().as_str(),
            "success" | "ok" | "created" | "200" | "201"
        ),
        Some(Value::Number(number)) => !number
            .as_u64()
            .map(|code| (200..300).contains(&code))
            .unwrap_or(false),
        Some(Value::Bool(ok)) => !ok,
        _ => false,
    };

    if failed {
        let message = non_empty_str(payload.get("message"))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Backend reported status {}", payload["status"]));
        return Err(ClientError::ApiLogic(message));
    }
    Ok(())
}

fn nested_provider_code(value: &Value) -> Option<String> {
    if let Some(code) = non_empty_str(value.pointer("/error/message")) {
        return Some(code.to_string());
    }
    if let Some(code) = non_empty_str(value.pointer("/detail/error/message")) {
        return Some(code.to_string());
    }
    // Backends that forward the provider body as a string inside `detail`.
    if let Some(detail) = value.get("detail").and_then(Value::as_str) {
        if let Ok(inner) = serde_json::from_str::<Value>(detail) {
            return non_empty_str(inner.pointer("/error/message")).map(str::to_string);
        }
    }
    None
}

fn detail_text(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.trim().to_string()),
        // Request validation errors arrive as a list of `{ "msg": ... }`.
        Value::Array(items) => items
            .first()
            .and_then(|item| non_empty_str(item.get("msg")))
            .map(str::to_string),
        Value::Object(_) => non_empty_str(value.pointer("/detail/message")).map(str::to_string),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn provider_code_wins_over_other_fields() {
        let body = json!({
            "error": { "message": "EMAIL_EXISTS" },
            "detail": "ignored",
            "message": "ignored"
        });
        let error = normalize_error_response(400, &body.to_string());
        assert_eq!(
            error.message(),
            "This email address is already in use by another account."
        );
        assert_eq!(error.kind(), ErrorKind::AuthProvider);
    }

    #[test]
    fn provider_code_forwarded_inside_detail_string() {
        let body = json!({ "detail": "{\"error\":{\"message\":\"INVALID_PASSWORD\"}}" });
        let error = normalize_error_response(400, &body.to_string());
        assert_eq!(error.message(), "The password is incorrect. Please try again.");
    }

    #[test]
    fn bare_provider_code_in_detail_is_mapped() {
        let error = normalize_error_response(400, r#"{"detail":"TOO_MANY_ATTEMPTS_TRY_LATER"}"#);
        assert_eq!(error.kind(), ErrorKind::AuthProvider);
    }

    #[test]
    fn detail_then_message_then_generic() {
        assert_eq!(
            normalize_error_response(404, r#"{"detail":"User not found"}"#),
            ClientError::Server {
                status: 404,
                message: "User not found".into()
            }
        );
        assert_eq!(
            normalize_error_response(500, r#"{"message":"Database down"}"#),
            ClientError::Server {
                status: 500,
                message: "Database down".into()
            }
        );
        assert_eq!(
            normalize_error_response(502, "<html>bad gateway</html>"),
            ClientError::Server {
                status: 502,
                message: "Server error (502)".into()
            }
        );
    }

    #[test]
    fn validation_error_lists_use_first_message() {
        let body = json!({ "detail": [{ "loc": ["body", "email"], "msg": "field required" }] });
        assert_eq!(
            normalize_error_response(422, &body.to_string()).message(),
            "field required"
        );
    }

    #[test]
    fn success_markers() {
        assert!(ensure_success(&json!({ "status": "success" })).is_ok());
        assert!(ensure_success(&json!({ "status": 200 })).is_ok());
        assert!(ensure_success(&json!({ "idToken": "x" })).is_ok());

        let err = ensure_success(&json!({ "status": "error", "message": "No such user" }))
            .unwrap_err();
        assert_eq!(err, ClientError::ApiLogic("No such user".into()));
        assert!(ensure_success(&json!({ "status": 500 })).is_err());
    }

    #[test]
    fn provider_code_in_a_2xx_body_fails() {
        let err = ensure_success(&json!({ "error": { "message": "EMAIL_EXISTS" } }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthProvider);
        assert_eq!(
            err.message(),
            "This email address is already in use by another account."
        );

        let err = ensure_success(&json!({ "detail": "WEAK_PASSWORD" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthProvider);
    }
}
