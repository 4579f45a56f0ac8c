//! Remindd configuration system.
//!
//! TOML file with serde defaults for every field, plus environment overrides
//! applied after load so a bare deployment can run on env vars alone.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RemindError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemindConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub fcm: FcmConfig,
}

/// Subscriber store (Supabase/PostgREST) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "users".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            table: default_table(),
        }
    }
}

/// Scheduler cadence, timezone, and message content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Fixed UTC offset of the timezone all reminder times are compared in.
    /// The app serves one region (KST), so this is a single shared constant.
    #[serde(default = "default_tz_offset")]
    pub timezone_offset_hours: i32,
    /// Seconds between dispatch cycles.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Simulation mode: no network sends, no dedup, widened match window.
    #[serde(default)]
    pub simulate: bool,
    /// Match tolerance in minutes when simulating (production is exact).
    #[serde(default = "default_window")]
    pub simulate_window_minutes: u32,
    /// Bound on concurrent provider calls within one cycle.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_body")]
    pub body: String,
}

fn default_tz_offset() -> i32 {
    9
}
fn default_interval() -> u64 {
    60
}
fn default_window() -> u32 {
    5
}
fn default_concurrency() -> usize {
    8
}
fn default_title() -> String {
    "복습할 시간입니다! 📚".into()
}
fn default_body() -> String {
    "오늘 공부한 내용을 잊기 전에 확인해보세요.".into()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            timezone_offset_hours: default_tz_offset(),
            interval_secs: default_interval(),
            simulate: false,
            simulate_window_minutes: default_window(),
            concurrency: default_concurrency(),
            title: default_title(),
            body: default_body(),
        }
    }
}

/// FCM service-account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    /// Path to the Firebase Admin service-account JSON.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
}

fn default_credentials_path() -> String {
    "secrets/firebase-adminsdk.json".into()
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
        }
    }
}

impl RemindConfig {
    /// Load config from the default path, falling back to pure defaults when
    /// no file exists. Environment overrides are applied either way.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific path (no env overrides applied).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RemindError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RemindError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Apply environment overrides on top of whatever was loaded.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            self.store.url = url;
        }
        if let Ok(key) = std::env::var("SUPABASE_KEY") {
            self.store.api_key = key;
        }
        // FIREBASE_CREDENTIALS wins over FIREBASE_JSON_PATH, matching the
        // deployment scripts of the surrounding app.
        if let Ok(path) = std::env::var("FIREBASE_JSON_PATH") {
            self.fcm.credentials_path = path;
        }
        if let Ok(path) = std::env::var("FIREBASE_CREDENTIALS") {
            self.fcm.credentials_path = path;
        }
        if let Ok(v) = std::env::var("REMINDD_SIMULATE") {
            self.notify.simulate = matches!(v.trim(), "1" | "true" | "TRUE" | "yes");
        }
        if let Ok(v) = std::env::var("REMINDD_INTERVAL_SECS") {
            if let Ok(secs) = v.trim().parse() {
                self.notify.interval_secs = secs;
            }
        }
    }

    /// Get the default config path (~/.remindd/config.toml).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".remindd")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RemindConfig::default();
        assert_eq!(config.notify.timezone_offset_hours, 9);
        assert_eq!(config.notify.interval_secs, 60);
        assert!(!config.notify.simulate);
        assert_eq!(config.store.table, "users");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: RemindConfig = toml::from_str(
            r#"
            [store]
            url = "https://example.supabase.co"
            api_key = "anon"

            [notify]
            simulate = true
            interval_secs = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.store.url, "https://example.supabase.co");
        assert!(config.notify.simulate);
        assert_eq!(config.notify.interval_secs, 300);
        // Untouched sections keep their defaults.
        assert_eq!(config.notify.timezone_offset_hours, 9);
        assert_eq!(config.fcm.credentials_path, "secrets/firebase-adminsdk.json");
    }
}
