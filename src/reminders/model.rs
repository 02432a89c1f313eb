use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

pub(crate) const DEFAULT_AMOUNT_PER_BOX: u32 = 10;
pub(crate) const DEFAULT_CURRENT_QUANTITY: u32 = 10;
pub(crate) const DEFAULT_REFILL_DAYS: u32 = 3;

/// A medication schedule entry as submitted to `/save-medicine-reminder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Also the id of the take notification. Defaults to the lower-cased name.
    #[serde(rename = "medicine_id")]
    pub id: String,
    pub name: String,
    pub dosage: String,
    /// Time of day the take notification fires, in the device's offset.
    pub time: NaiveTime,
    /// Last day of the course.
    #[serde(default)]
    pub duration: Option<NaiveDate>,
    pub amount_per_box: u32,
    pub current_quantity: u32,
    pub enable_take_alert: bool,
    pub ring_phone: bool,
    pub send_message: bool,
    pub refill_reminder: bool,
    /// How many days before `refill_date` the refill notification fires.
    pub refill_days: u32,
    #[serde(default)]
    pub refill_date: Option<DateTime<FixedOffset>>,
    pub start_from_today: bool,
}

impl Reminder {
    pub fn new(name: impl Into<String>, dosage: impl Into<String>, time: NaiveTime) -> Self {
        let name = name.into();
        Self {
            id: name.trim().to_lowercase(),
            name,
            dosage: dosage.into(),
            time,
            duration: None,
            amount_per_box: DEFAULT_AMOUNT_PER_BOX,
            current_quantity: DEFAULT_CURRENT_QUANTITY,
            enable_take_alert: false,
            ring_phone: false,
            send_message: false,
            refill_reminder: false,
            refill_days: DEFAULT_REFILL_DAYS,
            refill_date: None,
            start_from_today: false,
        }
    }

    pub fn with_take_alert(mut self) -> Self {
        self.enable_take_alert = true;
        self
    }

    pub fn with_refill(mut self, refill_date: DateTime<FixedOffset>, refill_days: u32) -> Self {
        self.refill_reminder = true;
        self.refill_date = Some(refill_date);
        self.refill_days = refill_days;
        self
    }

    pub(crate) fn validate(&self) -> ClientResult<()> {
        if self.name.trim().is_empty() || self.dosage.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Please fill in all required fields.".into(),
            ));
        }
        if self.id.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Reminder identifier must not be empty.".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eight_am() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn new_reminder_uses_form_defaults() {
        let reminder = Reminder::new("Aspirin", "100mg", eight_am());

        assert_eq!(reminder.id, "aspirin");
        assert_eq!(reminder.amount_per_box, 10);
        assert_eq!(reminder.current_quantity, 10);
        assert_eq!(reminder.refill_days, 3);
        assert!(!reminder.enable_take_alert);
    }

    #[test]
    fn name_and_dosage_are_required() {
        assert!(Reminder::new("Aspirin", "100mg", eight_am()).validate().is_ok());
        assert!(Reminder::new("  ", "100mg", eight_am()).validate().is_err());
        assert!(Reminder::new("Aspirin", "", eight_am()).validate().is_err());
    }

    #[test]
    fn wire_form_uses_medicine_id() {
        let value = serde_json::to_value(Reminder::new("Aspirin", "100mg", eight_am())).unwrap();

        assert_eq!(value["medicine_id"], json!("aspirin"));
        assert_eq!(value["time"], json!("08:00:00"));
        assert_eq!(value["refill_date"], json!(null));
        assert!(value.get("id").is_none());
    }
}
