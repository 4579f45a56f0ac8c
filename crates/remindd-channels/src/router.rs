//! Token classification — decide which provider a device token belongs to.
//!
//! Expo wraps the device identifier in a literal `ExponentPushToken[...]`
//! envelope; FCM registration tokens are bare opaque strings. O(1), no
//! network, no caching.

/// The delivery channel a token routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Fcm,
    Expo,
    Invalid,
}

const EXPO_PREFIX: &str = "ExponentPushToken[";

/// Classify a device push token by its lexical form.
pub fn classify(token: &str) -> ChannelKind {
    let token = token.trim();
    if token.is_empty() {
        ChannelKind::Invalid
    } else if token.starts_with(EXPO_PREFIX) {
        ChannelKind::Expo
    } else {
        ChannelKind::Fcm
    }
}

/// Short token prefix for logs. Full tokens are credentials and never logged.
pub fn token_snippet(token: &str) -> String {
    const KEEP: usize = 12;
    let token = token.trim();
    if token.chars().count() <= KEEP {
        token.to_string()
    } else {
        let prefix: String = token.chars().take(KEEP).collect();
        format!("{prefix}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_expo() {
        assert_eq!(classify("ExponentPushToken[abc123]"), ChannelKind::Expo);
        assert_eq!(classify("  ExponentPushToken[abc123]  "), ChannelKind::Expo);
    }

    #[test]
    fn test_classify_fcm() {
        assert_eq!(classify("dGhpcyBpcyBhIGZjbSB0b2tlbg"), ChannelKind::Fcm);
        // Anything non-empty that is not Expo-wrapped goes to FCM.
        assert_eq!(classify("ExpoPushToken[abc]"), ChannelKind::Fcm);
    }

    #[test]
    fn test_classify_invalid() {
        assert_eq!(classify(""), ChannelKind::Invalid);
        assert_eq!(classify("   "), ChannelKind::Invalid);
    }

    #[test]
    fn test_token_snippet_truncates() {
        let snippet = token_snippet("ExponentPushToken[secret-device-id]");
        assert_eq!(snippet, "ExponentPush…");
        assert!(!snippet.contains("secret"));
        assert_eq!(token_snippet("short"), "short");
    }
}
