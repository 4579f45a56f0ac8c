//! Duplicate-send guard.
//!
//! Cycles fire far more often than once per day, and the match window in
//! simulation is several minutes wide — without this guard every cycle
//! landing inside the window would re-notify the same user. The only dedup
//! dimension is the calendar day in the target timezone.
//!
//! The dedup column is optional: deployments that predate the migration
//! reject it with a missing-column error. That is detected once, recorded on
//! this tracker (not in any global), and the write path is bypassed for the
//! rest of the process — the send itself still counts as successful.

use chrono::NaiveDate;
use remindd_store::SubscriberStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct DedupTracker {
    store: Arc<dyn SubscriberStore>,
    column_available: AtomicBool,
}

impl DedupTracker {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self {
            store,
            column_available: AtomicBool::new(true),
        }
    }

    /// Already notified today? Absent or older stamps never skip.
    pub fn should_skip(last_sent: Option<NaiveDate>, today: NaiveDate) -> bool {
        last_sent.is_some_and(|day| day >= today)
    }

    /// Whether the store schema is still believed to have the dedup column.
    pub fn column_available(&self) -> bool {
        self.column_available.load(Ordering::Relaxed)
    }

    /// Record that the schema lacks the column. Logged once per detection.
    pub fn mark_column_missing(&self) {
        if self.column_available.swap(false, Ordering::Relaxed) {
            tracing::warn!(
                "⚠️ Dedup column missing from subscriber schema — duplicate-send \
                 protection disabled until the migration is applied"
            );
        }
    }

    /// Stamp today's date after a confirmed send. Never fails the send:
    /// a missing column flips the capability, anything else is logged.
    pub async fn mark_sent(&self, identity: &str, today: NaiveDate) {
        if !self.column_available() {
            return;
        }
        match self.store.set_last_sent(identity, today).await {
            Ok(()) => tracing::debug!("💾 Dedup stamp written: {identity} → {today}"),
            Err(e) if e.is_missing_column() => self.mark_column_missing(),
            Err(e) => tracing::warn!("⚠️ Dedup stamp failed for {identity}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remindd_core::Subscriber;
    use remindd_store::MemoryStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sub(email: &str) -> Subscriber {
        Subscriber {
            email: email.into(),
            notify_enabled: true,
            push_token: Some("tok".into()),
            remind_time: None,
            last_sent: None,
        }
    }

    #[test]
    fn test_should_skip() {
        let today = day(2026, 8, 30);
        assert!(!DedupTracker::should_skip(None, today));
        assert!(!DedupTracker::should_skip(Some(day(2026, 8, 29)), today));
        assert!(DedupTracker::should_skip(Some(today), today));
        assert!(DedupTracker::should_skip(Some(day(2026, 8, 31)), today));
    }

    #[tokio::test]
    async fn test_mark_sent_then_skip_until_tomorrow() {
        let store = Arc::new(MemoryStore::new(vec![sub("a@x")]));
        let tracker = DedupTracker::new(store.clone());
        let today = day(2026, 8, 30);

        tracker.mark_sent("a@x", today).await;
        let stamped = store.last_sent_of("a@x");
        assert_eq!(stamped, Some(today));
        assert!(DedupTracker::should_skip(stamped, today));
        // Next calendar day the guard opens again.
        assert!(!DedupTracker::should_skip(stamped, day(2026, 8, 31)));
    }

    #[tokio::test]
    async fn test_missing_column_degrades_once() {
        let store = Arc::new(MemoryStore::without_dedup_column(vec![sub("a@x")]));
        let tracker = DedupTracker::new(store);
        assert!(tracker.column_available());

        tracker.mark_sent("a@x", day(2026, 8, 30)).await;
        assert!(!tracker.column_available());
        // Subsequent stamps are a no-op rather than repeated errors.
        tracker.mark_sent("a@x", day(2026, 8, 30)).await;
        assert!(!tracker.column_available());
    }
}
