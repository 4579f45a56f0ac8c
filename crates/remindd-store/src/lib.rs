//! # Remindd Store
//!
//! Subscriber store abstraction. The scheduler only ever performs two
//! operations against it: list the dispatch candidates and stamp the dedup
//! date after a confirmed send. Everything else about the users table belongs
//! to the CRUD layer of the surrounding app.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::NaiveDate;
use remindd_core::{Result, Subscriber};

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// Which rows and columns a candidate read should cover.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFilter {
    /// Restrict to rows with notifications enabled (production). Simulation
    /// reads everything and filters on "has a reminder time" client-side.
    pub require_notify_enabled: bool,
    /// Include the dedup column in the select list. Turned off once schema
    /// drift has been detected, or in simulation mode where dedup is unused.
    pub include_last_sent: bool,
}

/// The two reads/writes this daemon performs against the subscriber store.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// List subscribers matching the filter.
    ///
    /// Must fail with [`remindd_core::RemindError::MissingColumn`] when the
    /// select list names a column the schema does not have, and with a plain
    /// store error for everything else.
    async fn list_candidates(&self, filter: CandidateFilter) -> Result<Vec<Subscriber>>;

    /// Write today's date into the subscriber's dedup column.
    ///
    /// Same error contract as [`Self::list_candidates`] for the missing
    /// column case.
    async fn set_last_sent(&self, identity: &str, day: NaiveDate) -> Result<()>;
}
