use std::sync::Arc;

use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::gateway::ApiGateway;
use crate::profile::model::UserProfile;
use crate::profile::LOGGER;
use crate::storage::SharedStorage;

/// General-storage key of the cached profile.
pub const USER_PROFILE_KEY: &str = "userProfile";

const SAVE_PROFILE_PATH: &str = "/user-details";
const FETCH_PROFILE_PATH: &str = "/user-detail";

/// Saves and fetches the signed-in user's profile. The last successful
/// fetch is cached in general storage.
#[derive(Clone)]
pub struct ProfileService {
    gateway: Arc<ApiGateway>,
    cache: SharedStorage,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("gateway", &self.gateway)
            .field("cache_key", &USER_PROFILE_KEY)
            .finish()
    }
}

impl ProfileService {
    pub fn new(gateway: Arc<ApiGateway>, cache: SharedStorage) -> Self {
        Self { gateway, cache }
    }

    pub async fn save_user_details(&self, profile: &UserProfile) -> ClientResult<Value> {
        let fields = profile.to_request_fields()?;
        if fields.is_empty() {
            return Err(ClientError::InvalidInput(
                "Profile has no fields to save.".into(),
            ));
        }
        self.gateway
            .post(SAVE_PROFILE_PATH, Value::Object(fields))
            .await
    }

    pub async fn fetch_user_details(&self) -> ClientResult<UserProfile> {
        let payload = self.gateway.post(FETCH_PROFILE_PATH, Value::Null).await?;
        let data = match payload.get("data") {
            Some(data @ Value::Object(_)) => data.clone(),
            _ => {
                let err = ClientError::api_logic("Profile response has no data object");
                LOGGER.error(err.to_string());
                return Err(err);
            }
        };

        let serialized = data.to_string();
        let profile: UserProfile = serde_json::from_value(data)
            .map_err(|err| ClientError::api_logic(format!("Invalid profile data: {err}")))?;

        if let Err(err) = self.cache.set(USER_PROFILE_KEY, serialized).await {
            LOGGER.warn(format!("Failed to cache profile: {err}"));
        }
        Ok(profile)
    }

    /// The last fetched profile. A cache entry that no longer parses reads as
    /// absent.
    pub async fn cached_profile(&self) -> ClientResult<Option<UserProfile>> {
        let Some(raw) = self.cache.get(USER_PROFILE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                LOGGER.warn(format!("Discarding unreadable profile cache: {err}"));
                Ok(None)
            }
        }
    }

    pub async fn clear_cache(&self) -> ClientResult<()> {
        self.cache.remove(USER_PROFILE_KEY).await
    }
}
