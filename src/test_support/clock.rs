use chrono::{DateTime, FixedOffset};

/// 2025-03-01 09:00 at UTC+1, the instant most time-dependent tests start from.
pub fn fixed_now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-03-01T09:00:00+01:00")
        .expect("valid RFC 3339 timestamp")
}
