//! The reminder engine — one evaluate-and-send cycle per timer tick.
//!
//! Cycles never overlap: the loop awaits each cycle before selecting the
//! next tick, and a cycle that overruns the interval just causes skipped
//! ticks (logged). Any single subscriber failing — unparseable time, empty
//! token, provider rejection — is logged and never aborts the cycle; only a
//! failed candidate read does, and the next tick retries independently.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use futures::{FutureExt, StreamExt};
use remindd_channels::{token_snippet, ChannelSet};
use remindd_core::config::NotifyConfig;
use remindd_core::{Result, Subscriber};
use remindd_store::{CandidateFilter, SubscriberStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::dedup::DedupTracker;
use crate::matching::is_due;
use crate::timenorm::normalize;

/// Outcome counters for one dispatch cycle. Ephemeral — nothing here is
/// persisted beyond the dedup stamps written along the way.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    pub candidates: usize,
    pub matched: usize,
    pub parse_failures: usize,
    pub skipped_dedup: usize,
    pub skipped_no_token: usize,
    pub sent: usize,
    pub failed: usize,
}

enum DispatchOutcome {
    Sent,
    SkippedNoToken,
    Failed,
}

pub struct ReminderEngine {
    notify: NotifyConfig,
    store: Arc<dyn SubscriberStore>,
    channels: ChannelSet,
    dedup: DedupTracker,
}

impl ReminderEngine {
    pub fn new(
        notify: NotifyConfig,
        store: Arc<dyn SubscriberStore>,
        channels: ChannelSet,
    ) -> Self {
        let dedup = DedupTracker::new(store.clone());
        Self {
            notify,
            store,
            channels,
            dedup,
        }
    }

    fn target_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.notify.timezone_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset"))
    }

    /// Run one cycle against the wall clock in the target timezone.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.run_cycle_at(Utc::now().with_timezone(&self.target_offset()))
            .await
    }

    /// Run one cycle as of a given instant. Split out so tests can pin "now".
    pub async fn run_cycle_at(&self, now: DateTime<FixedOffset>) -> Result<CycleReport> {
        let simulate = self.notify.simulate;
        let now_hm = now.format("%H:%M").to_string();
        let now_hms = now.format("%H:%M:%S").to_string();
        let today = now.date_naive();

        tracing::debug!(
            "⏰ Cycle check — {now_hms} (UTC{:+}){}",
            self.notify.timezone_offset_hours,
            if simulate { " [simulate]" } else { "" }
        );

        let candidates = self.read_candidates(simulate).await?;
        let mut report = CycleReport {
            candidates: candidates.len(),
            ..CycleReport::default()
        };

        // Production matches the minute exactly; simulation tolerates a
        // small window so operators see traffic without timing the cycle.
        let window = if simulate {
            self.notify.simulate_window_minutes
        } else {
            0
        };

        let mut due: Vec<Subscriber> = Vec::new();
        for sub in candidates {
            let Some(raw) = sub.remind_time.as_ref() else {
                continue;
            };
            let canonical = normalize(raw, self.notify.timezone_offset_hours);
            if canonical.is_empty() {
                report.parse_failures += 1;
                tracing::warn!("⚠️ Unparseable remind_time for {}: {:?}", sub.email, raw);
                continue;
            }
            if !is_due(&canonical, &now_hm, window) {
                continue;
            }
            report.matched += 1;
            if !simulate && DedupTracker::should_skip(sub.last_sent, today) {
                report.skipped_dedup += 1;
                tracing::debug!("⏭️ Already sent today, skipping {}", sub.email);
                continue;
            }
            due.push(sub);
        }

        if due.is_empty() {
            tracing::info!(
                "🔍 {now_hm}: 0 sends out of {} candidate(s) (matched {}, dedup-skipped {})",
                report.candidates,
                report.matched,
                report.skipped_dedup
            );
            return Ok(report);
        }
        tracing::info!("📣 {now_hm}: dispatching to {} subscriber(s)", due.len());

        // Per-subscriber sends are independent; fan out with a bound so one
        // cycle cannot flood the providers.
        let dispatches: Vec<_> = due
            .iter()
            .map(|sub| self.dispatch_one(sub, today, simulate).boxed())
            .collect();
        let outcomes: Vec<DispatchOutcome> = futures::stream::iter(dispatches)
            .buffer_unordered(self.notify.concurrency.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                DispatchOutcome::Sent => report.sent += 1,
                DispatchOutcome::SkippedNoToken => report.skipped_no_token += 1,
                DispatchOutcome::Failed => report.failed += 1,
            }
        }
        tracing::info!(
            "✅ Cycle done — sent {}, failed {}, no-token {}",
            report.sent,
            report.failed,
            report.skipped_no_token
        );
        Ok(report)
    }

    /// Candidate read, with the one-shot schema-drift fallback: when the read
    /// fails only because the select named the dedup column, flip the
    /// capability and retry once without it.
    async fn read_candidates(&self, simulate: bool) -> Result<Vec<Subscriber>> {
        let filter = CandidateFilter {
            require_notify_enabled: !simulate,
            include_last_sent: !simulate && self.dedup.column_available(),
        };
        let rows = match self.store.list_candidates(filter).await {
            Ok(rows) => rows,
            Err(e) if e.is_missing_column() && filter.include_last_sent => {
                self.dedup.mark_column_missing();
                self.store
                    .list_candidates(CandidateFilter {
                        include_last_sent: false,
                        ..filter
                    })
                    .await?
            }
            Err(e) => return Err(e),
        };

        if simulate {
            // Simulation candidates are anyone with a reminder time set, so
            // the pipeline can be exercised before any user flips the
            // enabled bit. Make that fallback visible in the logs.
            if !rows.iter().any(|s| s.notify_enabled) {
                tracing::warn!(
                    "🧪 No subscriber has notifications enabled — simulating against \
                     every row with a reminder time"
                );
            }
            Ok(rows.into_iter().filter(|s| s.remind_time.is_some()).collect())
        } else {
            Ok(rows)
        }
    }

    async fn dispatch_one(
        &self,
        sub: &Subscriber,
        today: NaiveDate,
        simulate: bool,
    ) -> DispatchOutcome {
        let token = match sub.push_token.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => {
                tracing::info!("⏭️ No push token for {}, skipping", sub.email);
                return DispatchOutcome::SkippedNoToken;
            }
        };
        let Some(channel) = self.channels.for_token(token) else {
            tracing::warn!("⚠️ Unroutable push token for {}: {}", sub.email, token_snippet(token));
            return DispatchOutcome::SkippedNoToken;
        };

        match channel
            .send(token, &self.notify.title, &self.notify.body)
            .await
        {
            Ok(()) => {
                if !simulate {
                    self.dedup.mark_sent(&sub.email, today).await;
                }
                tracing::info!("🔔 Reminder sent to {} via {}", sub.email, channel.name());
                DispatchOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(
                    "❌ Send failed for {} via {} ({}): {e}",
                    sub.email,
                    channel.name(),
                    token_snippet(token)
                );
                DispatchOutcome::Failed
            }
        }
    }

    /// The scheduler loop. One cycle per tick, cycles never overlap, and a
    /// shutdown signal lets an in-flight cycle finish before stopping.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let interval_secs = self.notify.interval_secs.max(1);
        tracing::info!(
            "🚀 Reminder scheduler started (every {interval_secs}s, UTC{:+}{})",
            self.notify.timezone_offset_hours,
            if self.notify.simulate { ", simulate" } else { "" }
        );

        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => {
                    tracing::info!("🛑 Reminder scheduler stopped");
                    return;
                }
            }

            let started = Instant::now();
            // A store read failure aborts only this cycle; the next tick
            // retries with no carried-over state.
            if let Err(e) = self.run_cycle().await {
                tracing::warn!("❌ Cycle aborted: {e}");
            }
            if started.elapsed() > Duration::from_secs(interval_secs) {
                tracing::warn!(
                    "⚠️ Cycle ran {:?}, longer than the {interval_secs}s interval — tick(s) skipped",
                    started.elapsed()
                );
            }
        }
    }
}
