use std::sync::Arc;

use reqwest::Method;
use serde_json::{Map, Value};

use crate::auth::SessionGuard;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::gateway::normalize::ensure_success;
use crate::gateway::transport::Transport;
use crate::gateway::LOGGER;

const ID_TOKEN_FIELD: &str = "idToken";

/// Sends authenticated JSON requests.
///
/// A valid id token is obtained from the [`SessionGuard`] for every call
/// (refreshing first when needed) and merged into the body as `idToken`.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    transport: Arc<Transport>,
    session: Arc<SessionGuard>,
}

impl ApiGateway {
    pub fn new(transport: Arc<Transport>, session: Arc<SessionGuard>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionGuard> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub async fn post(&self, path: &str, body: Value) -> ClientResult<Value> {
        let url = self.transport.config().backend_endpoint(path);
        self.send(Method::POST, &url, body).await
    }

    pub async fn delete(&self, path: &str, body: Value) -> ClientResult<Value> {
        let url = self.transport.config().backend_endpoint(path);
        self.send(Method::DELETE, &url, body).await
    }

    /// POSTs to an absolute URL outside the backend, such as the chat service.
    pub async fn post_url(&self, url: &str, body: Value) -> ClientResult<Value> {
        self.send(Method::POST, url, body).await
    }

    async fn send(&self, method: Method, url: &str, body: Value) -> ClientResult<Value> {
        let id_token = self.session.id_token().await?;
        let body = with_id_token(body, id_token)?;

        let result = self
            .transport
            .send_json(method.clone(), url, &body)
            .await
            .and_then(|payload| {
                ensure_success(&payload)?;
                Ok(payload)
            });

        match &result {
            Err(ClientError::ApiLogic(detail)) => {
                LOGGER.error(format!("{method} {url} returned an unusable payload: {detail}"));
            }
            Err(err) => LOGGER.debug(format!("{method} {url} failed: {err}")),
            Ok(_) => {}
        }
        result
    }
}

/// Merges the id token into a JSON object body. `null` counts as an empty
/// object; any other non-object body is rejected.
pub(crate) fn with_id_token(body: Value, id_token: String) -> ClientResult<Value> {
    let mut fields = match body {
        Value::Object(fields) => fields,
        Value::Null => Map::new(),
        other => {
            return Err(ClientError::InvalidInput(format!(
                "Request body must be a JSON object, got {other}"
            )))
        }
    };
    fields.insert(ID_TOKEN_FIELD.to_string(), Value::String(id_token));
    Ok(Value::Object(fields))
}
