//! Sync configuration.

use std::time::Duration;
use ticklist_store::{LocalStore, StoreResult};

/// Environment variable enabling sync.
pub const ENV_SYNC_ENABLED: &str = "TICKLIST_SYNC_ENABLED";
/// Environment variable holding the sync server base URL.
pub const ENV_SERVER_URL: &str = "TICKLIST_SYNC_SERVER_URL";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "TICKLIST_SYNC_API_KEY";
/// Environment variable overriding the device id.
pub const ENV_DEVICE_ID: &str = "TICKLIST_SYNC_DEVICE_ID";
/// Environment variable for the background sync interval in seconds.
pub const ENV_SYNC_INTERVAL: &str = "TICKLIST_SYNC_INTERVAL";
/// Environment variable toggling sync-on-change.
pub const ENV_AUTO_SYNC: &str = "TICKLIST_AUTO_SYNC_ON_CHANGE";
/// Environment variable for the retry attempt count.
pub const ENV_RETRY_ATTEMPTS: &str = "TICKLIST_SYNC_RETRY_ATTEMPTS";
/// Environment variable for the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "TICKLIST_SYNC_TIMEOUT";

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the sync subsystem.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Whether sync is enabled at all.
    pub enabled: bool,
    /// Base URL of the sync server.
    pub server_url: String,
    /// Bearer credential sent with every request.
    pub api_key: String,
    /// Per-installation device identifier; empty means "resolve from the
    /// store" (see [`SyncSettings::ensure_device_id`]).
    pub device_id: String,
    /// Background sync interval in seconds.
    pub sync_interval_secs: u64,
    /// Whether every mutation triggers a fire-and-forget sync.
    pub auto_sync_on_change: bool,
    /// Declared retry attempt count. Carried in configuration but not yet
    /// consumed by any retry loop.
    pub retry_attempts: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: String::new(),
            api_key: String::new(),
            device_id: String::new(),
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            auto_sync_on_change: true,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SyncSettings {
    /// Loads settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok();
        Self {
            enabled: parse_bool(env(ENV_SYNC_ENABLED), false),
            server_url: env(ENV_SERVER_URL).unwrap_or_default(),
            api_key: env(ENV_API_KEY).unwrap_or_default(),
            device_id: env(ENV_DEVICE_ID).unwrap_or_default(),
            sync_interval_secs: parse_u64(env(ENV_SYNC_INTERVAL), DEFAULT_SYNC_INTERVAL_SECS),
            auto_sync_on_change: parse_bool(env(ENV_AUTO_SYNC), true),
            retry_attempts: parse_u64(env(ENV_RETRY_ATTEMPTS), u64::from(DEFAULT_RETRY_ATTEMPTS))
                as u32,
            timeout_secs: parse_u64(env(ENV_TIMEOUT), DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Fills in the device id from the store's persisted metadata,
    /// generating and persisting one on first use. An id supplied through
    /// configuration wins and is left untouched.
    pub fn ensure_device_id(&mut self, store: &LocalStore) -> StoreResult<()> {
        if self.device_id.is_empty() {
            self.device_id = store.device_id()?;
        }
        Ok(())
    }

    /// Returns the request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the background sync interval as a [`Duration`].
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    /// Sets the server URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Sets the device id.
    pub fn with_device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = id.into();
        self
    }

    /// Enables or disables sync.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enables or disables sync-on-change.
    pub fn with_auto_sync_on_change(mut self, auto: bool) -> Self {
        self.auto_sync_on_change = auto;
        self
    }

    /// Sets the background sync interval in seconds.
    pub fn with_sync_interval_secs(mut self, secs: u64) -> Self {
        self.sync_interval_secs = secs;
        self
    }
}

/// Accepts "true", "1", and "yes" (case-insensitive) as true.
fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) if !v.is_empty() => {
            let v = v.to_lowercase();
            v == "true" || v == "1" || v == "yes"
        }
        _ => default,
    }
}

fn parse_u64(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
