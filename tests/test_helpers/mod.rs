//! Scoped environment overrides for integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use botwatch::config::ENV_PREFIX;

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Every variable read by `TrackerConfig::from_env`.
pub const TRACKER_VARS: [&str; 5] = [
    "SYNC_INTERVAL_SECS",
    "PROVIDER_TIMEOUT_SECS",
    "CLEANUP_INTERVAL_SECS",
    "RETENTION_HOURS",
    "PROVIDER_URL",
];

/// Restores the tracker environment when dropped.
///
/// Holding the guard serializes environment access across tests.
pub struct TrackerEnv {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl TrackerEnv {
    /// Clears every tracker variable, then applies `overrides`.
    ///
    /// Keys are given without the `BOT_STATUS_` prefix.
    pub fn with(overrides: &[(&str, &str)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = TRACKER_VARS
            .iter()
            .map(|suffix| {
                let key = OsString::from(format!("{ENV_PREFIX}{suffix}"));
                let value = env::var_os(&key);
                (key, value)
            })
            .collect();

        unsafe {
            // SAFETY: the global mutex serializes environment mutations in tests.
            for suffix in TRACKER_VARS {
                env::remove_var(format!("{ENV_PREFIX}{suffix}"));
            }
            for (suffix, value) in overrides {
                env::set_var(format!("{ENV_PREFIX}{suffix}"), value);
            }
        }

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for TrackerEnv {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(previous) => env::set_var(&key, &previous),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}
