use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ClientError, ClientResult};
use crate::storage::KeyValueStorage;

/// Stores each key as a plain text file under a directory.
///
/// Does not encrypt; intended for desktop builds and development. Mobile hosts
/// plug their keystore in through [`ClosureStorage`](super::ClosureStorage).
#[derive(Clone)]
pub struct FileStorage {
    dir: Arc<PathBuf>,
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage").field("dir", &self.dir).finish()
    }
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Arc::new(dir.as_ref().to_path_buf()),
        }
    }

    fn path_for(&self, key: &str) -> ClientResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid || key.starts_with('.') {
            return Err(ClientError::storage(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ClientError::storage(format!(
                "Failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> ClientResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&*self.dir).await.map_err(|err| {
            ClientError::storage(format!("Failed to create storage directory: {err}"))
        })?;
        tokio::fs::write(&path, value.as_bytes())
            .await
            .map_err(|err| {
                ClientError::storage(format!("Failed to write {}: {err}", path.display()))
            })
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::storage(format!(
                "Failed to remove {}: {err}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("carelink-storage-test-{}-{}", name, std::process::id()));
        path
    }

    #[tokio::test(flavor = "current_thread")]
    async fn roundtrip_file_storage() {
        let dir = temp_dir("roundtrip");
        let storage = FileStorage::new(&dir);

        assert!(storage.get("authTokens").await.unwrap().is_none());
        storage.set("authTokens", "payload".into()).await.unwrap();
        assert_eq!(
            storage.get("authTokens").await.unwrap().as_deref(),
            Some("payload")
        );

        storage.remove("authTokens").await.unwrap();
        assert!(storage.get("authTokens").await.unwrap().is_none());
        storage.remove("authTokens").await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejects_keys_that_escape_the_directory() {
        let storage = FileStorage::new(temp_dir("escape"));
        let err = storage.get("../secrets").await.unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
