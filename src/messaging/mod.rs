//! Push-token registration and the assistant chat.

use std::sync::LazyLock;

use crate::logger::Logger;

mod api;
mod model;

pub(crate) static LOGGER: LazyLock<Logger> =
    LazyLock::new(|| Logger::new("@carelink/messaging"));

#[doc(inline)]
pub use api::{MessagingService, CHAT_FALLBACK_RESPONSE, CHAT_HISTORY_KEY, CHAT_HISTORY_LIMIT};

#[doc(inline)]
pub use model::{ChatMessage, ChatSender};
