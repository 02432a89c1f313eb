use crate::auth::model::CredentialBundle;
use crate::auth::LOGGER;
use crate::error::{ClientError, ClientResult};
use crate::storage::SharedStorage;

/// Secure-storage key holding the serialized credential bundle.
pub const AUTH_TOKENS_KEY: &str = "authTokens";

/// Sole owner of the persisted [`CredentialBundle`].
///
/// Nothing else keeps a copy: consumers call [`TokenStore::load`] for every
/// operation. Writes are last-write-wins.
#[derive(Clone)]
pub struct TokenStore {
    storage: SharedStorage,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("key", &AUTH_TOKENS_KEY)
            .finish()
    }
}

impl TokenStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub async fn save(&self, bundle: &CredentialBundle) -> ClientResult<()> {
        if !bundle.is_complete() {
            return Err(ClientError::api_logic(
                "Refusing to persist an incomplete credential bundle",
            ));
        }
        let serialized = serde_json::to_string(bundle).map_err(|err| {
            ClientError::storage(format!("Failed to serialize credential bundle: {err}"))
        })?;
        self.storage.set(AUTH_TOKENS_KEY, serialized).await
    }

    /// Returns the stored bundle, or `None` when there is no usable session.
    ///
    /// A payload that parses but lacks a field, or holds an empty one, is
    /// treated as absent; one that does not parse at all is a storage error.
    pub async fn load(&self) -> ClientResult<Option<CredentialBundle>> {
        let Some(raw) = self.storage.get(AUTH_TOKENS_KEY).await? else {
            return Ok(None);
        };

        let bundle: CredentialBundle = serde_json::from_str(&raw).map_err(|err| {
            ClientError::storage(format!("Failed to parse stored credential bundle: {err}"))
        })?;

        if !bundle.is_complete() {
            LOGGER.warn("Ignoring incomplete credential bundle in secure storage");
            return Ok(None);
        }
        Ok(Some(bundle))
    }

    pub async fn clear(&self) -> ClientResult<()> {
        self.storage.remove(AUTH_TOKENS_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ClosureStorage, InMemoryStorage, KeyValueStorage};
    use std::sync::Arc;

    #[tokio::test(flavor = "current_thread")]
    async fn save_then_load_returns_same_bundle() {
        let store = TokenStore::new(InMemoryStorage::shared());
        let bundle = CredentialBundle::new("id", "refresh", 1_700_000_000_000).unwrap();

        store.save(&bundle).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(bundle));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn clear_removes_the_bundle() {
        let store = TokenStore::new(InMemoryStorage::shared());
        let bundle = CredentialBundle::new("id", "refresh", 42).unwrap();
        store.save(&bundle).await.unwrap();

        store.clear().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn incomplete_payload_loads_as_absent() {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .set(
                AUTH_TOKENS_KEY,
                r#"{"idToken":"","refreshToken":"r","expiryTime":5}"#.into(),
            )
            .await
            .unwrap();
        let store = TokenStore::new(storage);

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unreadable_storage_is_a_storage_error() {
        let store = TokenStore::new(Arc::new(ClosureStorage::new(
            |_| Err(ClientError::storage("keystore unavailable")),
            |_, _| Ok(()),
            |_| Ok(()),
        )));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn corrupt_payload_is_a_storage_error() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.set(AUTH_TOKENS_KEY, "not json".into()).await.unwrap();
        let store = TokenStore::new(storage);

        assert!(matches!(store.load().await, Err(ClientError::Storage(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn payload_missing_a_field_loads_as_absent() {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .set(AUTH_TOKENS_KEY, r#"{"idToken":"id","expiryTime":5}"#.into())
            .await
            .unwrap();
        let store = TokenStore::new(storage);

        assert_eq!(store.load().await.unwrap(), None);
    }
}
