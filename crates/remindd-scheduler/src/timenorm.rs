//! Time normalization — every driver shape down to one canonical `"HH:MM"`.
//!
//! The subscriber store is reached through a client whose driver returns
//! time-of-day values inconsistently: `"14:05"`, `"14:05:00"`, a UTC-suffixed
//! `"05:05:00+00"`, a full ISO timestamp, an integer seconds-offset, or a
//! structured value. One permissive parser here keeps that mess out of the
//! match logic. Unparseable input yields `""` — a value that never matches —
//! and never panics.

use regex::Regex;
use remindd_core::RawRemindTime;
use std::sync::OnceLock;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// First `hour<sep>minute` pair in a time string. Separators seen in the
/// wild: `:`, `.`, and a stray space.
fn time_pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})[:.\s](\d{2})").expect("static regex"))
}

/// Normalize a raw reminder time to canonical `"HH:MM"` in the target
/// timezone, or `""` when the value cannot be parsed.
///
/// `utc_offset_hours` is the fixed offset of the target timezone; it is only
/// applied to text values that carry an explicit UTC marker.
pub fn normalize(raw: &RawRemindTime, utc_offset_hours: i32) -> String {
    match raw {
        RawRemindTime::Clock { hour, minute } => format_hm(*hour, *minute).unwrap_or_default(),
        RawRemindTime::SecondsFromMidnight(secs) => {
            let secs = secs.rem_euclid(SECONDS_PER_DAY);
            format_hm((secs / 3600) as u32, ((secs % 3600) / 60) as u32).unwrap_or_default()
        }
        RawRemindTime::Text(s) => normalize_text(s, utc_offset_hours).unwrap_or_default(),
    }
}

fn format_hm(hour: u32, minute: u32) -> Option<String> {
    if hour < 24 && minute < 60 {
        Some(format!("{hour:02}:{minute:02}"))
    } else {
        None
    }
}

fn normalize_text(s: &str, utc_offset_hours: i32) -> Option<String> {
    let mut s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Explicit UTC markers, as emitted by timestamptz-backed drivers.
    let mut is_utc = false;
    for marker in ["+00:00", "+00", "-00", "Z", "z"] {
        if let Some(stripped) = s.strip_suffix(marker) {
            s = stripped;
            is_utc = true;
            break;
        }
    }

    // ISO timestamps carry a date before the `T` separator.
    if let Some((_, time_part)) = s.split_once('T') {
        s = time_part;
    }

    let (hour, minute) = extract_pair(s)?;
    if hour > 23 || minute > 59 {
        return None;
    }

    let hour = if is_utc {
        (hour as i32 + utc_offset_hours).rem_euclid(24) as u32
    } else {
        hour
    };
    format_hm(hour, minute)
}

/// Pattern match first, fixed-width slice (`s[0..2]`, `s[3..5]`) as the
/// fallback for separator-less values.
fn extract_pair(s: &str) -> Option<(u32, u32)> {
    if let Some(caps) = time_pair_re().captures(s) {
        let hour = caps.get(1)?.as_str().parse().ok()?;
        let minute = caps.get(2)?.as_str().parse().ok()?;
        return Some((hour, minute));
    }
    let hour = s.get(0..2)?.parse().ok()?;
    let minute = s.get(3..5)?.parse().ok()?;
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm_text(s: &str) -> String {
        normalize(&RawRemindTime::Text(s.into()), 9)
    }

    #[test]
    fn test_plain_variants() {
        assert_eq!(norm_text("14:05"), "14:05");
        assert_eq!(norm_text("14:05:00"), "14:05");
        assert_eq!(norm_text("  07:30:00 "), "07:30");
        assert_eq!(norm_text("7:05"), "07:05");
        assert_eq!(norm_text("14.05"), "14:05");
    }

    #[test]
    fn test_utc_suffix_applies_offset() {
        // "05:05:00+00" and "14:05" are the same instant at UTC+9.
        assert_eq!(norm_text("05:05:00+00"), "14:05");
        assert_eq!(norm_text("05:05:00+00:00"), "14:05");
        assert_eq!(norm_text("05:05:00Z"), "14:05");
        assert_eq!(norm_text("05:05:00-00"), "14:05");
        // Wraps past midnight.
        assert_eq!(norm_text("22:30Z"), "07:30");
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(norm_text("2026-01-01T07:30:00"), "07:30");
        assert_eq!(norm_text("2026-01-01T22:30:00Z"), "07:30");
    }

    #[test]
    fn test_structured_and_seconds() {
        assert_eq!(normalize(&RawRemindTime::Clock { hour: 7, minute: 30 }, 9), "07:30");
        assert_eq!(normalize(&RawRemindTime::Clock { hour: 24, minute: 0 }, 9), "");
        // 27000s = 07:30.
        assert_eq!(normalize(&RawRemindTime::SecondsFromMidnight(27000), 9), "07:30");
        // Reduced modulo 24h.
        assert_eq!(
            normalize(&RawRemindTime::SecondsFromMidnight(27000 + SECONDS_PER_DAY), 9),
            "07:30"
        );
        assert_eq!(normalize(&RawRemindTime::SecondsFromMidnight(-3600), 9), "23:00");
    }

    #[test]
    fn test_unparseable_yields_empty() {
        assert_eq!(norm_text(""), "");
        assert_eq!(norm_text("noon-ish"), "");
        assert_eq!(norm_text("25:61"), "");
        assert_eq!(norm_text("99:00"), "");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["14:05", "05:05:00+00", "2026-01-01T07:30:00Z", "7.45"] {
            let once = norm_text(raw);
            assert!(!once.is_empty(), "expected {raw} to normalize");
            assert_eq!(norm_text(&once), once, "not idempotent for {raw}");
        }
    }
}
