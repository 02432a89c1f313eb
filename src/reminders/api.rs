use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde_json::json;

use crate::error::{ClientError, ClientResult};
use crate::gateway::ApiGateway;
use crate::platform::clock::Clock;
use crate::reminders::model::Reminder;
use crate::reminders::notifier::{LocalNotifier, NotificationRequest};
use crate::reminders::schedule::{refill_notification_id, refill_trigger, take_trigger};
use crate::reminders::LOGGER;

const SAVE_REMINDER_PATH: &str = "/save-medicine-reminder";
const DELETE_REMINDER_PATH: &str = "/delete-medicine";

/// Local notifications registered for a saved reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduledReminder {
    pub take_alert_at: Option<DateTime<FixedOffset>>,
    pub refill_alert_at: Option<DateTime<FixedOffset>>,
}

/// Saves reminders to the backend and mirrors them as local notifications.
///
/// Notifications are only registered after the backend accepted the
/// reminder. Submitting the same reminder twice saves it twice.
pub struct ReminderScheduler {
    gateway: Arc<ApiGateway>,
    notifier: Arc<dyn LocalNotifier>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl ReminderScheduler {
    pub fn new(
        gateway: Arc<ApiGateway>,
        notifier: Arc<dyn LocalNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            clock,
        }
    }

    pub async fn create_reminder(&self, reminder: &Reminder) -> ClientResult<ScheduledReminder> {
        reminder.validate()?;
        let body = serde_json::to_value(reminder).map_err(|err| {
            ClientError::InvalidInput(format!("Reminder cannot be serialized: {err}"))
        })?;
        self.gateway.post(SAVE_REMINDER_PATH, body).await?;

        let now = self.clock.now();
        let mut scheduled = ScheduledReminder::default();
        let mut first_error = None;

        // Take and refill alerts are independent: a refused one does not
        // keep the other from being scheduled.
        if reminder.enable_take_alert {
            let fire_at = take_trigger(reminder, now)?;
            match self.notifier.schedule(take_notification(reminder, fire_at)).await {
                Ok(()) => scheduled.take_alert_at = Some(fire_at),
                Err(err) => {
                    LOGGER.error(format!(
                        "Reminder {} saved but take alert not scheduled: {err}",
                        reminder.id
                    ));
                    first_error.get_or_insert(err);
                }
            }
        }

        if reminder.refill_reminder {
            match refill_trigger(reminder, now) {
                Some(fire_at) => {
                    match self.notifier.schedule(refill_notification(reminder, fire_at)).await {
                        Ok(()) => scheduled.refill_alert_at = Some(fire_at),
                        Err(err) => {
                            LOGGER.error(format!(
                                "Reminder {} saved but refill alert not scheduled: {err}",
                                reminder.id
                            ));
                            first_error.get_or_insert(err);
                        }
                    }
                }
                None => LOGGER.debug(format!(
                    "Refill reminder for {} already due, not scheduled",
                    reminder.id
                )),
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        LOGGER.info(format!("Saved reminder {}", reminder.id));
        Ok(scheduled)
    }

    /// Deletes the reminder on the backend, then cancels both of its
    /// notifications.
    pub async fn delete_reminder(&self, id: &str) -> ClientResult<()> {
        if id.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Reminder identifier must not be empty.".into(),
            ));
        }
        self.gateway
            .delete(DELETE_REMINDER_PATH, json!({ "medicine_id": id }))
            .await?;

        let take = self.notifier.cancel(id).await;
        let refill = self.notifier.cancel(&refill_notification_id(id)).await;
        take?;
        refill?;
        LOGGER.info(format!("Deleted reminder {id}"));
        Ok(())
    }
}

fn take_notification(reminder: &Reminder, fire_at: DateTime<FixedOffset>) -> NotificationRequest {
    NotificationRequest {
        id: reminder.id.clone(),
        title: "Medication Reminder".into(),
        body: format!("Time to take {} of {}", reminder.dosage, reminder.name),
        fire_at,
        data: BTreeMap::from([("medicineId".to_string(), reminder.id.clone())]),
    }
}

fn refill_notification(reminder: &Reminder, fire_at: DateTime<FixedOffset>) -> NotificationRequest {
    NotificationRequest {
        id: refill_notification_id(&reminder.id),
        title: "Refill Reminder".into(),
        body: format!(
            "Time to refill {}. Only {} days left!",
            reminder.name, reminder.refill_days
        ),
        fire_at,
        data: BTreeMap::new(),
    }
}
