//! Helpers for invoking the built `globuild` binary in tests.

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::Path;

/// Captured output from a `globuild` invocation.
#[derive(Debug)]
pub struct GlobuildRun {
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
}

/// Run `globuild` in `current_dir` with `args` and extra environment.
///
/// `PATH` is cleared so a host compiler can never be picked up by accident.
pub fn run_globuild_in<K, V>(
    current_dir: &Path,
    args: &[&str],
    envs: impl IntoIterator<Item = (K, V)>,
) -> Result<GlobuildRun>
where
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::cargo_bin("globuild").context("locate globuild binary")?;
    let output = cmd
        .current_dir(current_dir)
        .env("PATH", "")
        .envs(envs)
        .args(args)
        .output()
        .context("run globuild command")?;
    Ok(GlobuildRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}
