//! Domain types for the svcforge settings file.
//!
//! Pure functions only. No I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_DATA_ROOT: &str = "/var/lib/svcforge";
pub const DEFAULT_PROBE_IMAGE: &str = "dokku/wait:0.6.0";

// ── Settings schema ──────────────────────────────────────────────────────────

/// Top-level settings stored in `~/.svcforge/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root directory for per-service data.
    pub data_root: Option<PathBuf>,
    /// Template registry directory; the vendored bundle when unset.
    pub registry_path: Option<PathBuf>,
    /// Readiness probe tuning.
    pub readiness: ReadinessSettings,
}

impl Settings {
    #[must_use]
    pub fn data_root(&self) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT))
    }
}

/// Readiness probe settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReadinessSettings {
    /// Attempts per port before giving up.
    pub attempts: u32,
    /// Upper bound on a single attempt, in seconds.
    pub timeout_secs: u64,
    /// Delay between attempts, in seconds.
    pub wait_secs: u64,
    /// Image the probe container runs.
    pub image: String,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            attempts: 1,
            timeout_secs: 5,
            wait_secs: 1,
            image: DEFAULT_PROBE_IMAGE.to_string(),
        }
    }
}

impl ReadinessSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
