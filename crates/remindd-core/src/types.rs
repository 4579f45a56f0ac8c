//! Subscriber data model — the rows this daemon reads and the one field it writes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One user's reminder settings, as read from the subscriber store.
///
/// Rows are created and updated by the CRUD layer of the surrounding app;
/// this daemon only reads them and stamps `last_sent` after a confirmed send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    /// Opaque unique key (the app uses the email).
    pub email: String,
    /// Candidate for dispatch only when true (production mode).
    #[serde(default)]
    pub notify_enabled: bool,
    /// Device push token. May be absent or empty — such rows are skipped at
    /// dispatch time but still counted in cycle diagnostics.
    #[serde(default)]
    pub push_token: Option<String>,
    /// Raw reminder time-of-day, in whatever shape the driver returned it.
    #[serde(default)]
    pub remind_time: Option<RawRemindTime>,
    /// Date of the most recent successful send, when the schema has the
    /// column and a send has happened.
    #[serde(default)]
    pub last_sent: Option<NaiveDate>,
}

/// The driver-dependent encodings a reminder time arrives in.
///
/// PostgREST serializes a `time` column as text, but older schemas stored an
/// integer seconds-offset, and test fixtures build structured values
/// directly. Decoding happens once, at the store boundary; everything past
/// it works with the canonical `HH:MM` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRemindTime {
    /// Structured time-of-day with explicit hour/minute fields.
    Clock { hour: u32, minute: u32 },
    /// Duration since midnight, in seconds.
    SecondsFromMidnight(i64),
    /// Text in any of the formats the drivers emit:
    /// `"14:05"`, `"14:05:00"`, `"05:05:00+00"`, `"2026-01-01T07:30:00Z"`, ...
    Text(String),
}

impl Subscriber {
    /// Whether a non-empty push token is present.
    pub fn has_token(&self) -> bool {
        self.push_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_time_decodes_text() {
        let raw: RawRemindTime = serde_json::from_str("\"14:05:00\"").unwrap();
        assert_eq!(raw, RawRemindTime::Text("14:05:00".into()));
    }

    #[test]
    fn test_raw_time_decodes_seconds() {
        let raw: RawRemindTime = serde_json::from_str("27000").unwrap();
        assert_eq!(raw, RawRemindTime::SecondsFromMidnight(27000));
    }

    #[test]
    fn test_raw_time_decodes_clock() {
        let raw: RawRemindTime = serde_json::from_str(r#"{"hour": 7, "minute": 30}"#).unwrap();
        assert_eq!(raw, RawRemindTime::Clock { hour: 7, minute: 30 });
    }

    #[test]
    fn test_has_token() {
        let mut sub = Subscriber {
            email: "a@b.c".into(),
            notify_enabled: true,
            push_token: None,
            remind_time: None,
            last_sent: None,
        };
        assert!(!sub.has_token());
        sub.push_token = Some("  ".into());
        assert!(!sub.has_token());
        sub.push_token = Some("fcm-token".into());
        assert!(sub.has_token());
    }
}
