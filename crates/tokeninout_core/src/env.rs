//! Process-global environment mutation helpers.
//!
//! `Config::from_env` reads process state, so tests that exercise it must
//! serialize on [`env_lock`] and scope their overrides with [`EnvGuard`].

use std::sync::{Mutex, OnceLock};

/// Return the global lock used to serialize environment mutations in tests.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: Callers must serialize mutation when test threads may run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Restores an environment variable value on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    fn swap(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }

    /// Set `key=value` and restore the previous value when dropped.
    pub fn set(key: &str, value: &str) -> Self {
        Self::swap(key, Some(value))
    }

    /// Remove `key` and restore the previous value when dropped.
    pub fn remove(key: &str) -> Self {
        Self::swap(key, None)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(self.key.as_str(), self.previous.as_deref());
    }
}
