//! Credential lifecycle: account creation, login, token refresh and logout,
//! plus the session guard that decides whether a stored session is usable.

use std::sync::LazyLock;

use crate::logger::Logger;

mod api;
pub(crate) mod error;
mod model;
mod persistence;
mod session;

pub(crate) static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("@carelink/auth"));

#[doc(inline)]
pub use api::{AuthClient, RefreshTokenResponse, ACCOUNT_TYPE_KEY};

#[doc(inline)]
pub use error::provider_message;

#[doc(inline)]
pub use model::{AccountType, CredentialBundle};

#[doc(inline)]
pub use persistence::{TokenStore, AUTH_TOKENS_KEY};

#[doc(inline)]
pub use session::{SessionGuard, SessionState};
