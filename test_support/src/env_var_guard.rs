//! Temporarily set or clear an environment variable.
//!
//! `std::env::set_var` and `remove_var` are `unsafe` in Rust 2024. Callers
//! hold an [`EnvLock`](crate::env_lock::EnvLock) for as long as the guard
//! lives; the previous value is restored on drop.

use std::ffi::OsString;

/// Restores one environment variable when dropped.
#[derive(Debug)]
pub struct EnvVarGuard {
    name: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    /// Set `name` to `value`.
    #[must_use]
    pub fn set(name: &'static str, value: &str) -> Self {
        let prev = std::env::var_os(name);
        // SAFETY: callers hold `EnvLock`, serialising environment mutation.
        unsafe { std::env::set_var(name, value) };
        Self { name, prev }
    }

    /// Clear `name`.
    #[must_use]
    pub fn remove(name: &'static str) -> Self {
        let prev = std::env::var_os(name);
        // SAFETY: callers hold `EnvLock`, serialising environment mutation.
        unsafe { std::env::remove_var(name) };
        Self { name, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match self.prev.take() {
            // SAFETY: the guard is dropped while `EnvLock` is still held.
            Some(value) => unsafe { std::env::set_var(self.name, value) },
            // SAFETY: as above.
            None => unsafe { std::env::remove_var(self.name) },
        }
    }
}
