use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{ClientError, ClientResult};
use crate::gateway::ApiGateway;
use crate::messaging::model::{ChatMessage, ChatSender};
use crate::messaging::LOGGER;
use crate::platform::clock::Clock;
use crate::storage::SharedStorage;

/// General-storage key of the chat transcript.
pub const CHAT_HISTORY_KEY: &str = "chatHistory";

/// Most recent transcript entries kept; older ones are dropped on append.
pub const CHAT_HISTORY_LIMIT: usize = 200;

/// Shown when the chat service answers without a `response` field.
pub const CHAT_FALLBACK_RESPONSE: &str = "I didn't get a clear response from the server.";

const SAVE_PUSH_TOKEN_PATH: &str = "/save-push-token";

pub struct MessagingService {
    gateway: Arc<ApiGateway>,
    cache: SharedStorage,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MessagingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingService")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl MessagingService {
    pub fn new(gateway: Arc<ApiGateway>, cache: SharedStorage, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            cache,
            clock,
        }
    }

    /// Registers the device push token with the backend.
    pub async fn register_push_token(&self, push_token: &str) -> ClientResult<()> {
        if push_token.trim().is_empty() {
            return Err(ClientError::InvalidInput("Push token must not be empty.".into()));
        }
        self.gateway
            .post(SAVE_PUSH_TOKEN_PATH, json!({ "push_token": push_token }))
            .await?;
        LOGGER.info("Push token registered");
        Ok(())
    }

    /// Sends a message to the assistant and returns its reply.
    ///
    /// The exchange is appended to the stored transcript; a transcript that
    /// cannot be written is logged and otherwise ignored.
    pub async fn send_chat_message(&self, text: &str) -> ClientResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::InvalidInput("Message must not be empty.".into()));
        }

        let chat_url = self.gateway.config().chat_url.clone();
        let sent_at = self.clock.now();
        let payload = self
            .gateway
            .post_url(&chat_url, json!({ "message": text }))
            .await?;

        let reply = payload
            .get("response")
            .and_then(Value::as_str)
            .filter(|reply| !reply.trim().is_empty())
            .unwrap_or(CHAT_FALLBACK_RESPONSE)
            .to_string();

        let received_at = self.clock.now();
        let exchange = [
            ChatMessage {
                id: sent_at.timestamp_millis().to_string(),
                text: text.to_string(),
                sender: ChatSender::User,
                timestamp: sent_at,
            },
            ChatMessage {
                id: (received_at.timestamp_millis() + 1).to_string(),
                text: reply.clone(),
                sender: ChatSender::Assistant,
                timestamp: received_at,
            },
        ];
        if let Err(err) = self.append_history(exchange).await {
            LOGGER.warn(format!("Failed to store chat history: {err}"));
        }
        Ok(reply)
    }

    /// The stored transcript, oldest first. An unreadable transcript reads as
    /// empty.
    pub async fn chat_history(&self) -> ClientResult<Vec<ChatMessage>> {
        let Some(raw) = self.cache.get(CHAT_HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                LOGGER.warn(format!("Discarding unreadable chat history: {err}"));
                Ok(Vec::new())
            }
        }
    }

    pub async fn clear_chat_history(&self) -> ClientResult<()> {
        self.cache.remove(CHAT_HISTORY_KEY).await
    }

    async fn append_history(&self, exchange: [ChatMessage; 2]) -> ClientResult<()> {
        let mut history = self.chat_history().await?;
        history.extend(exchange);
        let overflow = history.len().saturating_sub(CHAT_HISTORY_LIMIT);
        history.drain(..overflow);
        let serialized = serde_json::to_string(&history).map_err(|err| {
            ClientError::storage(format!("Failed to serialize chat history: {err}"))
        })?;
        self.cache.set(CHAT_HISTORY_KEY, serialized).await
    }
}
