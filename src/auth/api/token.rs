use serde::{Deserialize, Serialize};

use crate::auth::model::flexible_i64;
use crate::error::{ClientError, ClientResult};
use crate::gateway::Transport;

#[derive(Debug, Serialize)]
struct RefreshTokenRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

/// Secure-token endpoint answer. The provider may omit a rotated refresh
/// token, in which case the current one stays in use.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenResponse {
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(deserialize_with = "flexible_i64")]
    pub expires_in: i64,
}

/// Exchanges a refresh token for a new id token.
pub(crate) async fn refresh_id_token(
    transport: &Transport,
    refresh_token: &str,
) -> ClientResult<RefreshTokenResponse> {
    let url = transport.config().secure_token_url();
    let request = RefreshTokenRequest {
        grant_type: "refresh_token",
        refresh_token,
    };

    let payload = transport.post_form(&url, &request).await?;
    serde_json::from_value(payload)
        .map_err(|err| ClientError::api_logic(format!("Invalid refresh response: {err}")))
}
