//! Session and backend core of the CareLink elder-care app.
//!
//! The crate keeps the credential bundle in host-provided secure storage,
//! refreshes it through the identity provider's secure-token endpoint and
//! attaches the id token to every backend call. Medication reminders saved
//! through it are mirrored as local notifications.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use carelink_core::auth::AccountType;
//! use carelink_core::client::{CareClient, EntryRoute};
//! use carelink_core::config::ClientConfig;
//! use carelink_core::storage::FileStorage;
//!
//! # async fn run() -> carelink_core::error::ClientResult<()> {
//! let client = CareClient::builder(ClientConfig::for_backend("http://localhost:8000", "api-key"))
//!     .with_secure_storage(Arc::new(FileStorage::new("/data/secure")))
//!     .build()?;
//!
//! if client.entry_route().await == EntryRoute::Login {
//!     client
//!         .auth()
//!         .login("ada@example.com", "secret", AccountType::Elder)
//!         .await?;
//! }
//! let profile = client.profiles().fetch_user_details().await?;
//! println!("signed in as {:?}", profile.name);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logger;
pub mod messaging;
pub mod platform;
pub mod profile;
pub mod reminders;
pub mod storage;

#[cfg(test)]
pub mod test_support;
