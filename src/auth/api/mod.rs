use std::sync::Arc;

use serde_json::Value;

use crate::auth::error::is_terminal_refresh_code;
use crate::auth::model::{AccountType, CredentialBundle, CredentialsRequest, SignInTokens};
use crate::auth::persistence::TokenStore;
use crate::auth::LOGGER;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{ensure_success, Transport};
use crate::platform::clock::Clock;
use crate::storage::SharedStorage;

mod token;

pub use token::RefreshTokenResponse;

/// General-storage key caching the account type of the last sign-in.
pub const ACCOUNT_TYPE_KEY: &str = "account_type";

const CREATE_USER_PATH: &str = "/create-user";
const LOGIN_PATH: &str = "/login";

/// Talks to the backend and the secure-token endpoint on behalf of the
/// session. Every successful operation writes through the [`TokenStore`].
pub struct AuthClient {
    transport: Arc<Transport>,
    tokens: TokenStore,
    general: SharedStorage,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("transport", &self.transport)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    pub fn new(
        transport: Arc<Transport>,
        tokens: TokenStore,
        general: SharedStorage,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            tokens,
            general,
            clock,
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Registers the account, then signs in with the same credentials.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        account_type: AccountType,
    ) -> ClientResult<CredentialBundle> {
        self.try_create_account(email, password, account_type)
            .await
            .map_err(|err| {
                LOGGER.warn(format!("Account creation failed: {err}"));
                ClientError::account_creation(err)
            })
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        account_type: AccountType,
    ) -> ClientResult<CredentialBundle> {
        self.try_login(email, password, account_type)
            .await
            .map_err(|err| {
                LOGGER.warn(format!("Login failed: {err}"));
                ClientError::login(err)
            })
    }

    /// Mints a new id token from the stored refresh token and persists it.
    ///
    /// A terminal rejection of the refresh token ends the session: the store
    /// is cleared and [`ClientError::SessionExpired`] is returned. Any other
    /// failure leaves the stored bundle untouched.
    pub async fn refresh(&self) -> ClientResult<CredentialBundle> {
        let current = self.tokens.load().await?.ok_or(ClientError::NotSignedIn)?;

        let response = match token::refresh_id_token(&self.transport, current.refresh_token()).await
        {
            Ok(response) => response,
            Err(ClientError::AuthProvider { code, .. }) if is_terminal_refresh_code(&code) => {
                LOGGER.warn(format!("Refresh token rejected ({code}), ending session"));
                if let Err(err) = self.logout().await {
                    LOGGER.error(format!("Failed to clear rejected session: {err}"));
                }
                return Err(ClientError::SessionExpired);
            }
            Err(err) => {
                LOGGER.warn(format!("Token refresh failed: {err}"));
                return Err(err);
            }
        };

        let refresh_token = response
            .refresh_token
            .filter(|token| !token.is_empty())
            .unwrap_or_else(|| current.refresh_token().to_string());
        let bundle = CredentialBundle::from_expires_in(
            response.id_token,
            refresh_token,
            response.expires_in,
            self.clock.now_ms(),
        )?;
        self.tokens.save(&bundle).await?;
        LOGGER.debug("Id token refreshed");
        Ok(bundle)
    }

    /// Deletes the stored session and the cached account type.
    ///
    /// Both removals are attempted; the first failure is reported.
    pub async fn logout(&self) -> ClientResult<()> {
        let (tokens, account_type) = futures::join!(
            self.tokens.clear(),
            self.general.remove(ACCOUNT_TYPE_KEY)
        );
        if let Err(err) = &account_type {
            LOGGER.warn(format!("Failed to clear cached account type: {err}"));
        }
        tokens?;
        account_type?;
        LOGGER.info("Signed out");
        Ok(())
    }

    /// Account type of the last successful sign-in, if cached.
    pub async fn account_type(&self) -> ClientResult<Option<AccountType>> {
        let Some(raw) = self.general.get(ACCOUNT_TYPE_KEY).await? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(account_type) => Ok(Some(account_type)),
            Err(_) => {
                LOGGER.warn(format!("Ignoring unknown cached account type {raw:?}"));
                Ok(None)
            }
        }
    }

    async fn try_create_account(
        &self,
        email: &str,
        password: &str,
        account_type: AccountType,
    ) -> ClientResult<CredentialBundle> {
        let request = credentials_request(email, password, account_type)?;
        let payload = self.transport.post_json(CREATE_USER_PATH, &request).await?;
        ensure_success(&payload)?;
        if !account_created(&payload) {
            return Err(ClientError::api_logic(
                "Account creation response carried no success indicator",
            ));
        }
        LOGGER.info(format!("Created {account_type} account"));
        self.try_login(email, password, account_type).await
    }

    async fn try_login(
        &self,
        email: &str,
        password: &str,
        account_type: AccountType,
    ) -> ClientResult<CredentialBundle> {
        let request = credentials_request(email, password, account_type)?;
        let payload = self.transport.post_json(LOGIN_PATH, &request).await?;
        ensure_success(&payload)?;

        let tokens: SignInTokens = serde_json::from_value(payload)
            .map_err(|err| ClientError::api_logic(format!("Invalid login response: {err}")))?;
        let bundle = CredentialBundle::from_expires_in(
            tokens.id_token,
            tokens.refresh_token,
            tokens.expires_in,
            self.clock.now_ms(),
        )?;
        self.tokens.save(&bundle).await?;

        if let Err(err) = self
            .general
            .set(ACCOUNT_TYPE_KEY, account_type.as_str().to_string())
            .await
        {
            LOGGER.warn(format!("Failed to cache account type: {err}"));
        }
        LOGGER.info(format!("Signed in with {account_type} account"));
        Ok(bundle)
    }
}

fn credentials_request<'a>(
    email: &'a str,
    password: &'a str,
    account_type: AccountType,
) -> ClientResult<CredentialsRequest<'a>> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::InvalidInput(
            "Please enter your email address.".into(),
        ));
    }
    if password.is_empty() {
        return Err(ClientError::InvalidInput("Please enter your password.".into()));
    }
    Ok(CredentialsRequest {
        email,
        password,
        account_type,
    })
}

fn account_created(payload: &Value) -> bool {
    let status_ok = payload
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| status.eq_ignore_ascii_case("success"));
    status_ok || payload.get("user").is_some_and(Value::is_object)
}
