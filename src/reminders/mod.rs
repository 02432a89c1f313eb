//! Medication reminders: backend persistence plus the local notifications
//! that mirror each saved reminder.

use std::sync::LazyLock;

use crate::logger::Logger;

mod api;
mod model;
mod notifier;
mod schedule;

pub(crate) static LOGGER: LazyLock<Logger> =
    LazyLock::new(|| Logger::new("@carelink/reminders"));

#[doc(inline)]
pub use api::{ReminderScheduler, ScheduledReminder};

#[doc(inline)]
pub use model::Reminder;

#[doc(inline)]
pub use notifier::{InMemoryNotifier, LocalNotifier, NotificationRequest};

#[doc(inline)]
pub use schedule::{refill_notification_id, refill_trigger, take_trigger};
