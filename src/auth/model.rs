use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClientError, ClientResult};

/// The session triple: bearer token, refresh token and absolute expiry.
///
/// A bundle is always fully populated; constructors reject empty tokens so a
/// partial bundle can never reach the token store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    #[serde(default)]
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "flexible_i64")]
    expiry_time: i64,
}

impl CredentialBundle {
    pub fn new(
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expiry_time: i64,
    ) -> ClientResult<Self> {
        let bundle = Self {
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            expiry_time,
        };
        if !bundle.is_complete() {
            return Err(ClientError::api_logic(
                "Credential response is missing idToken or refreshToken",
            ));
        }
        Ok(bundle)
    }

    /// Computes the expiry as `now_ms + expires_in_secs * 1000`.
    pub fn from_expires_in(
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: i64,
        now_ms: i64,
    ) -> ClientResult<Self> {
        if expires_in_secs <= 0 {
            return Err(ClientError::api_logic(format!(
                "Invalid expiresIn value: {expires_in_secs}"
            )));
        }
        let expiry_time = expires_in_secs
            .checked_mul(1000)
            .and_then(|ms| ms.checked_add(now_ms))
            .ok_or_else(|| {
                ClientError::api_logic(format!("expiresIn out of range: {expires_in_secs}"))
            })?;
        Self::new(id_token, refresh_token, expiry_time)
    }

    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expiry_time(&self) -> i64 {
        self.expiry_time
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expiry_time
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.id_token.is_empty() && !self.refresh_token.is_empty() && self.expiry_time > 0
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expiry_time", &self.expiry_time)
            .finish()
    }
}

/// Which dashboard an account lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Elder,
    Child,
    Family,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Elder => "elder",
            AccountType::Child => "child",
            AccountType::Family => "family",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "elder" => Ok(AccountType::Elder),
            "child" => Ok(AccountType::Child),
            "family" => Ok(AccountType::Family),
            other => Err(ClientError::InvalidInput(format!(
                "Unknown account type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub account_type: AccountType,
}

/// Token fields returned by `/login` (and nested in `/create-user`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInTokens {
    pub id_token: String,
    pub refresh_token: String,
    #[serde(deserialize_with = "flexible_i64")]
    pub expires_in: i64,
}

/// Accepts an integer either as a JSON number or as a numeric string.
///
/// The identity provider sends `expiresIn` as `"3600"` and older clients wrote
/// `expiryTime` as a string.
pub(crate) fn flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid integer {value:?}: {err}"))),
    }
}
