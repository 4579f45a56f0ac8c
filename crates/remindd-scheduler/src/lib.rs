//! # Remindd Scheduler
//!
//! The reminder dispatch engine. Fires on a fixed cadence, decides which
//! subscribers are due "now" in the target timezone, filters out users
//! already notified today, and fans each survivor out to the push channel
//! that accepts their token.
//!
//! ## Architecture
//! ```text
//! ReminderEngine (tokio interval, cycles never overlap)
//!   ├── SubscriberStore.list_candidates
//!   ├── timenorm::normalize  — driver shapes → canonical "HH:MM"
//!   ├── matching::is_due     — exact in production, windowed in simulation
//!   ├── DedupTracker         — "already sent today" guard (production only)
//!   └── per match → ChannelSet.for_token → PushChannel.send → mark_sent
//! ```

pub mod dedup;
pub mod engine;
pub mod matching;
pub mod timenorm;

pub use dedup::DedupTracker;
pub use engine::{CycleReport, ReminderEngine};
