use std::fmt;

pub type ClientResult<T> = Result<T, ClientError>;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error: check your internet connection.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
pub const NOT_SIGNED_IN_MESSAGE: &str = "Missing token. Please log in.";
pub const STORAGE_ERROR_MESSAGE: &str = "Secure storage is unavailable. Please log in again.";
pub const TRY_AGAIN_MESSAGE: &str = "Something went wrong. Please try again.";

/// Error raised by every fallible operation of the crate.
///
/// Each variant carries enough information to render a user-facing message
/// through [`ClientError::message`] while [`ClientError::kind`] lets callers
/// branch on the category without inspecting message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No response was received from the backend (connect failure or timeout).
    Network(String),
    /// The identity provider rejected a credential operation.
    AuthProvider { code: String, message: String },
    /// The refresh token itself is invalid or expired; the session was cleared.
    SessionExpired,
    /// No credential bundle is stored.
    NotSignedIn,
    /// Transport succeeded but the payload failed validation.
    ApiLogic(String),
    /// The secure storage capability failed.
    Storage(String),
    /// The backend answered with a non-2xx status.
    Server { status: u16, message: String },
    /// Local validation rejected the input before any request was sent.
    InvalidInput(String),
    /// The local notification capability refused a schedule or cancel.
    Notification(String),
    AccountCreation { reason: Box<ClientError> },
    Login { reason: Box<ClientError> },
}

/// Coarse category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    AuthProvider,
    SessionExpired,
    NotSignedIn,
    ApiLogic,
    Storage,
    Server,
    InvalidInput,
    Notification,
}

impl ClientError {
    pub fn network(detail: impl Into<String>) -> Self {
        ClientError::Network(detail.into())
    }

    pub fn storage(detail: impl Into<String>) -> Self {
        ClientError::Storage(detail.into())
    }

    pub fn api_logic(detail: impl Into<String>) -> Self {
        ClientError::ApiLogic(detail.into())
    }

    pub fn account_creation(reason: ClientError) -> Self {
        ClientError::AccountCreation {
            reason: Box::new(reason),
        }
    }

    pub fn login(reason: ClientError) -> Self {
        ClientError::Login {
            reason: Box::new(reason),
        }
    }

    /// Returns the category of the innermost cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::AuthProvider { .. } => ErrorKind::AuthProvider,
            ClientError::SessionExpired => ErrorKind::SessionExpired,
            ClientError::NotSignedIn => ErrorKind::NotSignedIn,
            ClientError::ApiLogic(_) => ErrorKind::ApiLogic,
            ClientError::Storage(_) => ErrorKind::Storage,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::InvalidInput(_) => ErrorKind::InvalidInput,
            ClientError::Notification(_) => ErrorKind::Notification,
            ClientError::AccountCreation { reason } | ClientError::Login { reason } => {
                reason.kind()
            }
        }
    }

    /// Human-readable text suitable for an alert.
    pub fn message(&self) -> String {
        match self {
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::AuthProvider { message, .. } => message.clone(),
            ClientError::SessionExpired => SESSION_EXPIRED_MESSAGE.to_string(),
            ClientError::NotSignedIn => NOT_SIGNED_IN_MESSAGE.to_string(),
            ClientError::ApiLogic(_) => TRY_AGAIN_MESSAGE.to_string(),
            ClientError::Storage(_) => STORAGE_ERROR_MESSAGE.to_string(),
            ClientError::Server { message, .. } => message.clone(),
            ClientError::InvalidInput(message) => message.clone(),
            ClientError::Notification(_) => {
                "Could not schedule the reminder notification. Please try again.".to_string()
            }
            ClientError::AccountCreation { reason } | ClientError::Login { reason } => {
                reason.message()
            }
        }
    }

    /// True when the UI must return to the unauthenticated entry point.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::SessionExpired | ErrorKind::NotSignedIn | ErrorKind::Storage
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(detail) => write!(f, "Network error: {detail}"),
            ClientError::AuthProvider { code, message } => write!(f, "{message} ({code})"),
            ClientError::SessionExpired => write!(f, "{SESSION_EXPIRED_MESSAGE}"),
            ClientError::NotSignedIn => write!(f, "{NOT_SIGNED_IN_MESSAGE}"),
            ClientError::ApiLogic(detail) => write!(f, "Unexpected response: {detail}"),
            ClientError::Storage(detail) => write!(f, "Storage error: {detail}"),
            ClientError::Server { status, message } => write!(f, "{message} (status {status})"),
            ClientError::InvalidInput(message) => write!(f, "Invalid input: {message}"),
            ClientError::Notification(detail) => write!(f, "Notification error: {detail}"),
            ClientError::AccountCreation { reason } => {
                write!(f, "Account creation failed: {reason}")
            }
            ClientError::Login { reason } => write!(f, "Login failed: {reason}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::AccountCreation { reason } | ClientError::Login { reason } => {
                Some(reason.as_ref())
            }
            _ => None,
        }
    }
}
