//! Due-time matching on canonical `"HH:MM"` strings.
//!
//! Production matches exactly — the cycle cadence is one minute, so string
//! equality is the whole comparison. Simulation widens to a tolerance window
//! measured as circular minute distance, so a reminder near midnight still
//! matches a cycle on the other side of it.

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes since midnight for a canonical `"HH:MM"` string.
pub fn minutes_since_midnight(hhmm: &str) -> Option<u32> {
    let (h, m) = hhmm.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h < 24 && m < 60 {
        Some(h * 60 + m)
    } else {
        None
    }
}

/// Whether a subscriber whose reminder time normalizes to `candidate` is due
/// at `now`. `window_minutes == 0` means exact match; an empty candidate
/// never matches.
pub fn is_due(candidate: &str, now: &str, window_minutes: u32) -> bool {
    if candidate.is_empty() {
        return false;
    }
    if window_minutes == 0 {
        return candidate == now;
    }
    let (Some(a), Some(b)) = (minutes_since_midnight(candidate), minutes_since_midnight(now))
    else {
        return false;
    };
    let diff = a.abs_diff(b);
    diff.min(MINUTES_PER_DAY - diff) <= window_minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(is_due("07:30", "07:30", 0));
        assert!(!is_due("07:30", "07:31", 0));
        assert!(!is_due("", "", 0));
        assert!(!is_due("", "07:30", 5));
    }

    #[test]
    fn test_window_match() {
        assert!(is_due("07:30", "07:33", 5));
        assert!(is_due("07:33", "07:30", 5));
        assert!(!is_due("07:30", "07:36", 5));
    }

    #[test]
    fn test_midnight_wraparound() {
        assert!(is_due("23:58", "00:02", 5));
        assert!(is_due("00:02", "23:58", 5));
        assert!(!is_due("23:50", "00:10", 5));
    }

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight("00:00"), Some(0));
        assert_eq!(minutes_since_midnight("23:59"), Some(1439));
        assert_eq!(minutes_since_midnight("24:00"), None);
        assert_eq!(minutes_since_midnight("garbage"), None);
    }
}
