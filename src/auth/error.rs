use crate::error::ClientError;

/// Identity-provider error codes and the text shown for each.
const PROVIDER_MESSAGES: &[(&str, &str)] = &[
    (
        "EMAIL_EXISTS",
        "This email address is already in use by another account.",
    ),
    (
        "EMAIL_NOT_FOUND",
        "There is no account registered with this email address.",
    ),
    ("INVALID_PASSWORD", "The password is incorrect. Please try again."),
    ("INVALID_LOGIN_CREDENTIALS", "Incorrect email or password."),
    ("INVALID_EMAIL", "The email address is badly formatted."),
    ("MISSING_EMAIL", "Please enter your email address."),
    ("MISSING_PASSWORD", "Please enter your password."),
    (
        "WEAK_PASSWORD",
        "The password must be at least 6 characters long.",
    ),
    (
        "USER_DISABLED",
        "This account has been disabled by an administrator.",
    ),
    ("USER_NOT_FOUND", "The user account was not found."),
    (
        "TOO_MANY_ATTEMPTS_TRY_LATER",
        "Too many unsuccessful attempts. Please try again later.",
    ),
    (
        "OPERATION_NOT_ALLOWED",
        "Password sign-in is disabled for this application.",
    ),
    ("TOKEN_EXPIRED", "Your session has expired. Please log in again."),
    (
        "INVALID_REFRESH_TOKEN",
        "Your session is no longer valid. Please log in again.",
    ),
    (
        "MISSING_REFRESH_TOKEN",
        "Your session is no longer valid. Please log in again.",
    ),
];

/// Refresh failures after which the stored session can never be revived.
const TERMINAL_REFRESH_CODES: &[&str] = &[
    "INVALID_REFRESH_TOKEN",
    "TOKEN_EXPIRED",
    "USER_DISABLED",
    "USER_NOT_FOUND",
    "MISSING_REFRESH_TOKEN",
];

/// Strips the optional `" : detail"` suffix the identity provider appends,
/// e.g. `"WEAK_PASSWORD : Password should be at least 6 characters"`.
pub(crate) fn provider_code(raw: &str) -> &str {
    raw.split(" : ").next().unwrap_or(raw).trim()
}

pub fn provider_message(code: &str) -> Option<&'static str> {
    let code = provider_code(code);
    PROVIDER_MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

pub(crate) fn is_known_provider_code(raw: &str) -> bool {
    provider_message(raw).is_some()
}

/// Builds the tagged error for an identity-provider code. Unknown codes keep
/// the code itself in the message so nothing is lost.
pub(crate) fn provider_error(raw: &str) -> ClientError {
    let code = provider_code(raw).to_string();
    let message = provider_message(&code)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Authentication failed ({code})."));
    ClientError::AuthProvider { code, message }
}

pub(crate) fn is_terminal_refresh_code(code: &str) -> bool {
    TERMINAL_REFRESH_CODES.contains(&provider_code(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_email_exists() {
        assert_eq!(
            provider_message("EMAIL_EXISTS"),
            Some("This email address is already in use by another account.")
        );
    }

    #[test]
    fn strips_detail_suffix() {
        let error = provider_error("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(
            error,
            ClientError::AuthProvider {
                code: "WEAK_PASSWORD".into(),
                message: "The password must be at least 6 characters long.".into(),
            }
        );
    }

    #[test]
    fn unknown_codes_keep_the_code() {
        let error = provider_error("QUOTA_EXCEEDED");
        assert_eq!(error.message(), "Authentication failed (QUOTA_EXCEEDED).");
        assert!(!is_known_provider_code("QUOTA_EXCEEDED"));
    }

    #[test]
    fn terminal_refresh_codes() {
        assert!(is_terminal_refresh_code("INVALID_REFRESH_TOKEN"));
        assert!(is_terminal_refresh_code("TOKEN_EXPIRED"));
        assert!(!is_terminal_refresh_code("EMAIL_EXISTS"));
    }
}
