use httpmock::prelude::*;
use httpmock::{Mock, MockServer};
use serde_json::json;

/// Starts a mock backend. With [`ClientConfig::for_backend`] the same server
/// also answers as the secure-token endpoint under `/v1/token`.
///
/// [`ClientConfig::for_backend`]: crate::config::ClientConfig::for_backend
pub fn start_mock_server() -> MockServer {
    MockServer::start()
}

/// Mocks a successful token refresh minting `id_token` for one hour.
pub fn mock_token_refresh<'a>(server: &'a MockServer, id_token: &str) -> Mock<'a> {
    let body = json!({
        "id_token": id_token,
        "refresh_token": format!("{id_token}-refresh"),
        "expires_in": "3600"
    });
    server.mock(move |when, then| {
        when.method(POST).path("/v1/token");
        then.status(200).json_body(body);
    })
}
