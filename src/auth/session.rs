use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_lock::Mutex;

use crate::auth::api::AuthClient;
use crate::auth::LOGGER;
use crate::error::{ClientError, ClientResult};
use crate::platform::clock::Clock;

/// Where the stored session stands right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    /// The id token is still within its lifetime.
    Valid,
    /// A bundle exists but its id token has expired.
    Stale,
}

/// Outcome of the last refresh, tagged with the generation that produced it.
///
/// Only success or the error is kept. Callers that share a successful
/// refresh read the new bundle back from the [`TokenStore`](crate::auth::TokenStore).
#[derive(Default)]
struct RefreshSlot {
    generation: u64,
    outcome: Option<ClientResult<()>>,
}

/// Decides whether a usable session exists and funnels refreshes.
///
/// Callers that observe the same stale bundle while a refresh is running wait
/// for it and share its outcome instead of starting their own. The
/// generation counter is read before the bundle is loaded: if it moved by the
/// time the refresh lock is acquired, another caller already refreshed for
/// this stale bundle.
pub struct SessionGuard {
    auth: Arc<AuthClient>,
    clock: Arc<dyn Clock>,
    refresh_generation: AtomicU64,
    refresh_gate: Mutex<RefreshSlot>,
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field(
                "refresh_generation",
                &self.refresh_generation.load(Ordering::SeqCst),
            )
            .finish_non_exhaustive()
    }
}

impl SessionGuard {
    pub fn new(auth: Arc<AuthClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            auth,
            clock,
            refresh_generation: AtomicU64::new(0),
            refresh_gate: Mutex::new(RefreshSlot::default()),
        }
    }

    pub fn auth(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    pub async fn state(&self) -> ClientResult<SessionState> {
        let state = match self.auth.token_store().load().await? {
            None => SessionState::NoSession,
            Some(bundle) if bundle.is_valid_at(self.clock.now_ms()) => SessionState::Valid,
            Some(_) => SessionState::Stale,
        };
        Ok(state)
    }

    /// True when a usable id token exists, refreshing a stale one first.
    ///
    /// Never fails: storage and refresh errors are logged and read as `false`.
    pub async fn is_logged_in(&self) -> bool {
        match self.id_token().await {
            Ok(_) => true,
            Err(ClientError::NotSignedIn) => false,
            Err(err) => {
                LOGGER.warn(format!("Session check failed: {err}"));
                false
            }
        }
    }

    /// Returns a currently valid id token.
    pub async fn id_token(&self) -> ClientResult<String> {
        let seen = self.refresh_generation.load(Ordering::SeqCst);
        let bundle = self
            .auth
            .token_store()
            .load()
            .await?
            .ok_or(ClientError::NotSignedIn)?;

        if bundle.is_valid_at(self.clock.now_ms()) {
            return Ok(bundle.id_token().to_string());
        }

        self.refresh_once(seen).await
    }

    async fn refresh_once(&self, seen: u64) -> ClientResult<String> {
        let mut slot = self.refresh_gate.lock().await;
        if slot.generation != seen {
            if let Some(outcome) = slot.outcome.clone() {
                outcome?;
                let bundle = self
                    .auth
                    .token_store()
                    .load()
                    .await?
                    .ok_or(ClientError::NotSignedIn)?;
                return Ok(bundle.id_token().to_string());
            }
        }

        LOGGER.debug("Id token expired, refreshing");
        let outcome = self.auth.refresh().await;
        slot.generation = self.refresh_generation.fetch_add(1, Ordering::SeqCst) + 1;
        slot.outcome = Some(outcome.as_ref().map(|_| ()).map_err(Clone::clone));
        outcome.map(|bundle| bundle.id_token().to_string())
    }
}
