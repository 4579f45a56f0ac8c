//! In-memory subscriber store.
//!
//! Backs the scheduler's test scenarios and local dry runs. Mirrors the
//! PostgREST contract exactly, including the missing-column failure mode,
//! which can be toggled to exercise the schema-drift path.

use async_trait::async_trait;
use chrono::NaiveDate;
use remindd_core::{RemindError, Result, Subscriber};
use std::sync::Mutex;

use crate::supabase::LAST_SENT_COLUMN;
use crate::{CandidateFilter, SubscriberStore};

pub struct MemoryStore {
    rows: Mutex<Vec<Subscriber>>,
    /// Whether the simulated schema has the dedup column.
    has_dedup_column: bool,
}

impl MemoryStore {
    pub fn new(rows: Vec<Subscriber>) -> Self {
        Self {
            rows: Mutex::new(rows),
            has_dedup_column: true,
        }
    }

    /// Same store, but the schema predates the dedup-column migration.
    pub fn without_dedup_column(rows: Vec<Subscriber>) -> Self {
        Self {
            rows: Mutex::new(rows),
            has_dedup_column: false,
        }
    }

    /// Current dedup stamp for one subscriber.
    pub fn last_sent_of(&self, identity: &str) -> Option<NaiveDate> {
        self.rows
            .lock()
            .expect("memory store poisoned")
            .iter()
            .find(|s| s.email == identity)
            .and_then(|s| s.last_sent)
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn list_candidates(&self, filter: CandidateFilter) -> Result<Vec<Subscriber>> {
        if filter.include_last_sent && !self.has_dedup_column {
            return Err(RemindError::MissingColumn(LAST_SENT_COLUMN.into()));
        }
        let rows = self.rows.lock().expect("memory store poisoned");
        Ok(rows
            .iter()
            .filter(|s| !filter.require_notify_enabled || s.notify_enabled)
            .map(|s| {
                let mut s = s.clone();
                if !filter.include_last_sent {
                    s.last_sent = None;
                }
                s
            })
            .collect())
    }

    async fn set_last_sent(&self, identity: &str, day: NaiveDate) -> Result<()> {
        if !self.has_dedup_column {
            return Err(RemindError::MissingColumn(LAST_SENT_COLUMN.into()));
        }
        let mut rows = self.rows.lock().expect("memory store poisoned");
        match rows.iter_mut().find(|s| s.email == identity) {
            Some(sub) => {
                sub.last_sent = Some(day);
                Ok(())
            }
            None => Err(RemindError::Store(format!("No such subscriber: {identity}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(email: &str, enabled: bool) -> Subscriber {
        Subscriber {
            email: email.into(),
            notify_enabled: enabled,
            push_token: Some("tok".into()),
            remind_time: None,
            last_sent: None,
        }
    }

    #[tokio::test]
    async fn test_filter_by_notify_enabled() {
        let store = MemoryStore::new(vec![sub("a@x", true), sub("b@x", false)]);
        let all = store
            .list_candidates(CandidateFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let enabled = store
            .list_candidates(CandidateFilter {
                require_notify_enabled: true,
                include_last_sent: false,
            })
            .await
            .unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].email, "a@x");
    }

    #[tokio::test]
    async fn test_missing_column_read_and_write() {
        let store = MemoryStore::without_dedup_column(vec![sub("a@x", true)]);
        let err = store
            .list_candidates(CandidateFilter {
                require_notify_enabled: true,
                include_last_sent: true,
            })
            .await
            .unwrap_err();
        assert!(err.is_missing_column());

        let day = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert!(store.set_last_sent("a@x", day).await.unwrap_err().is_missing_column());
    }

    #[tokio::test]
    async fn test_set_last_sent() {
        let store = MemoryStore::new(vec![sub("a@x", true)]);
        let day = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        store.set_last_sent("a@x", day).await.unwrap();
        assert_eq!(store.last_sent_of("a@x"), Some(day));
        assert!(store.set_last_sent("ghost@x", day).await.is_err());
    }
}
