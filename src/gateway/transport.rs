use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::normalize::normalize_error_response;

const USER_AGENT: &str = concat!("carelink-core/", env!("CARGO_PKG_VERSION"));

/// Unauthenticated HTTP plumbing shared by the auth client and the gateway.
///
/// Every request carries the configured timeout. A request that never gets a
/// response is a [`ClientError::Network`]; a non-2xx answer goes through
/// [`normalize_error_response`].
#[derive(Clone)]
pub struct Transport {
    http: Client,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("backend_url", &self.config.backend_url)
            .finish()
    }
}

impl Transport {
    pub fn new(config: Arc<ClientConfig>) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ClientError::network(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POSTs a JSON body to a backend path.
    pub async fn post_json<B>(&self, path: &str, body: &B) -> ClientResult<Value>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.backend_endpoint(path);
        self.send_json(Method::POST, &url, body).await
    }

    /// Sends a JSON body to an absolute URL.
    pub async fn send_json<B>(&self, method: Method, url: &str, body: &B) -> ClientResult<Value>
    where
        B: Serialize + ?Sized,
    {
        self.execute(self.http.request(method, url).json(body)).await
    }

    /// POSTs an `application/x-www-form-urlencoded` body to an absolute URL.
    pub async fn post_form<F>(&self, url: &str, form: &F) -> ClientResult<Value>
    where
        F: Serialize + ?Sized,
    {
        self.execute(self.http.post(url).form(form)).await
    }

    async fn execute(&self, request: RequestBuilder) -> ClientResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|err| ClientError::network(err.to_string()))?;
        read_response(response).await
    }
}

async fn read_response(response: Response) -> ClientResult<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ClientError::network(err.to_string()))?;

    if !status.is_success() {
        return Err(normalize_error_response(status.as_u16(), &body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|err| ClientError::api_logic(format!("Response is not valid JSON: {err}")))
}
