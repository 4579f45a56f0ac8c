//! # Remindd Channels
//!
//! Push delivery implementations. Two providers with structurally
//! incompatible token formats:
//!
//! - **FCM v1** — bare device registration tokens, service-account auth.
//! - **Expo** — tokens wrapped in the `ExponentPushToken[...]` envelope,
//!   delivered through Expo's public push endpoint.
//!
//! A token must be routed to the right provider *before* dispatch — the
//! wrong one either errors or silently drops the message. Routing is purely
//! lexical, see [`router::classify`].

pub mod expo;
pub mod fcm;
pub mod router;

use async_trait::async_trait;
use remindd_core::Result;

pub use expo::ExpoChannel;
pub use fcm::FcmChannel;
pub use router::{classify, token_snippet, ChannelKind};

/// One concrete push provider.
///
/// `send` reports provider acceptance via `Result`; it never panics and the
/// failure variants (`Credentials`, `Http`, `Ticket`, `Channel`) say *why*
/// so the scheduler can log something diagnosable.
#[async_trait]
pub trait PushChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one notification to one device token.
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<()>;
}

/// The configured adapters, one per [`ChannelKind`].
pub struct ChannelSet {
    fcm: std::sync::Arc<dyn PushChannel>,
    expo: std::sync::Arc<dyn PushChannel>,
}

impl ChannelSet {
    pub fn new(
        fcm: std::sync::Arc<dyn PushChannel>,
        expo: std::sync::Arc<dyn PushChannel>,
    ) -> Self {
        Self { fcm, expo }
    }

    /// Pick the adapter that can accept this token, or None for an
    /// empty/unroutable token.
    pub fn for_token(&self, token: &str) -> Option<&dyn PushChannel> {
        match classify(token) {
            ChannelKind::Fcm => Some(self.fcm.as_ref()),
            ChannelKind::Expo => Some(self.expo.as_ref()),
            ChannelKind::Invalid => None,
        }
    }
}
