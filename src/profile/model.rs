use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

/// Profile fields known to the app. Anything else the backend returns is
/// kept in `extra` and sent back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hobby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// The profile as a request body, with every `null` field dropped.
    pub(crate) fn to_request_fields(&self) -> ClientResult<Map<String, Value>> {
        let value = serde_json::to_value(self).map_err(|err| {
            ClientError::InvalidInput(format!("Profile cannot be serialized: {err}"))
        })?;
        let Value::Object(mut fields) = value else {
            return Err(ClientError::InvalidInput(
                "Profile must serialize to an object".into(),
            ));
        };
        fields.retain(|_, value| !value.is_null());
        Ok(fields)
    }
}
