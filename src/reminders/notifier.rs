use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::ClientResult;

/// A timestamp-triggered local notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Scheduling a request with an existing id replaces the earlier one.
    pub id: String,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<FixedOffset>,
    pub data: BTreeMap<String, String>,
}

/// Device notification capability supplied by the host.
///
/// Failures are reported as
/// [`ClientError::Notification`](crate::error::ClientError::Notification).
#[async_trait]
pub trait LocalNotifier: Send + Sync {
    async fn schedule(&self, request: NotificationRequest) -> ClientResult<()>;

    /// Cancelling an unknown id is not an error.
    async fn cancel(&self, id: &str) -> ClientResult<()>;
}

/// Keeps pending notifications in memory; nothing is ever delivered.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotifier {
    pending: Arc<Mutex<BTreeMap<String, NotificationRequest>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<NotificationRequest> {
        self.pending.lock().unwrap().get(id).cloned()
    }

    /// Pending notifications ordered by id.
    pub fn pending(&self) -> Vec<NotificationRequest> {
        self.pending.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl LocalNotifier for InMemoryNotifier {
    async fn schedule(&self, request: NotificationRequest) -> ClientResult<()> {
        self.pending
            .lock()
            .unwrap()
            .insert(request.id.clone(), request);
        Ok(())
    }

    async fn cancel(&self, id: &str) -> ClientResult<()> {
        self.pending.lock().unwrap().remove(id);
        Ok(())
    }
}
