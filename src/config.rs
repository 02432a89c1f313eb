use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://192.168.29.121:8000";
pub const DEFAULT_SECURE_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";
pub const DEFAULT_CHAT_URL: &str =
    "http://lumia-env.eba-smvczc8e.us-east-1.elasticbeanstalk.com/chat";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Endpoint constants and transport settings.
///
/// `Default` carries the build-time endpoints; hosts that embed the crate in a
/// different environment deserialize their own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the application backend, without a trailing slash.
    pub backend_url: String,
    /// Identity provider API key passed to the secure token endpoint.
    pub api_key: String,
    #[serde(default = "default_secure_token_endpoint")]
    pub secure_token_endpoint: String,
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_secure_token_endpoint() -> String {
    DEFAULT_SECURE_TOKEN_ENDPOINT.to_string()
}

fn default_chat_url() -> String {
    DEFAULT_CHAT_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: String::new(),
            secure_token_endpoint: default_secure_token_endpoint(),
            chat_url: default_chat_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration pointing every endpoint at `backend_url`.
    ///
    /// Used by tests and local deployments where the token endpoint and chat
    /// service are served by the same host.
    pub fn for_backend(backend_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let backend_url = backend_url.into().trim_end_matches('/').to_string();
        Self {
            secure_token_endpoint: format!("{backend_url}/v1/token"),
            chat_url: format!("{backend_url}/chat"),
            backend_url,
            api_key: api_key.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backend_endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn secure_token_url(&self) -> String {
        format!("{}?key={}", self.secure_token_endpoint, self.api_key)
    }
}
