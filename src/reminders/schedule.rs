use chrono::{DateTime, Days, FixedOffset, TimeZone};

use crate::error::{ClientError, ClientResult};
use crate::reminders::model::Reminder;

pub fn refill_notification_id(reminder_id: &str) -> String {
    format!("refill-{reminder_id}")
}

/// When the take notification fires.
///
/// Today at the reminder's time, in `now`'s offset. If that instant is not
/// after `now` it moves to the same time tomorrow, unless the reminder starts
/// today, in which case it fires right away.
pub fn take_trigger(
    reminder: &Reminder,
    now: DateTime<FixedOffset>,
) -> ClientResult<DateTime<FixedOffset>> {
    let today = now
        .offset()
        .from_local_datetime(&now.date_naive().and_time(reminder.time))
        .single()
        .ok_or_else(|| ClientError::InvalidInput("Reminder time is not representable".into()))?;

    if today > now {
        return Ok(today);
    }
    if reminder.start_from_today {
        return Ok(now);
    }
    today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ClientError::InvalidInput("Reminder time is out of range".into()))
}

/// When the refill notification fires: `refill_days` before the refill date.
///
/// `None` when no refill is configured or that instant is not after `now`.
pub fn refill_trigger(
    reminder: &Reminder,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    if !reminder.refill_reminder {
        return None;
    }
    let fire_at = reminder
        .refill_date?
        .checked_sub_days(Days::new(u64::from(reminder.refill_days)))?;
    (fire_at > now).then_some(fire_at)
}
