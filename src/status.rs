//! User-facing progress reporting.
//!
//! Progress lines are written to stderr by [`ConsoleReporter`]; library
//! callers and tests use [`SilentReporter`]. Diagnostic detail goes through
//! `tracing` instead.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};

use crate::executor::ActionKind;

/// Report build progress to the user.
pub trait StatusReporter {
    /// A directory was created to hold an output.
    fn directory_created(&self, directory: &Utf8Path);

    /// An action is about to run for `output`.
    fn action_started(&self, kind: ActionKind, output: &Utf8Path);

    /// A derived output was removed by `clean`.
    fn output_removed(&self, path: &Utf8Path);

    /// A build finished successfully.
    fn build_complete(&self, executed: usize, up_to_date: usize);
}

/// Writes one line per event to stderr, with paths relative to the project
/// root.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    root: Utf8PathBuf,
}

impl ConsoleReporter {
    /// Report paths relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn relative<'a>(&self, path: &'a Utf8Path) -> &'a Utf8Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn line(message: &str) {
        // Status output failures must not abort the build.
        drop(writeln!(io::stderr(), "{message}"));
    }
}

impl StatusReporter for ConsoleReporter {
    fn directory_created(&self, directory: &Utf8Path) {
        Self::line(&format!("Created directory: {}", self.relative(directory)));
    }

    fn action_started(&self, kind: ActionKind, output: &Utf8Path) {
        Self::line(&format!("{} {}", kind.verb(), self.relative(output)));
    }

    fn output_removed(&self, path: &Utf8Path) {
        Self::line(&format!("Removed {}", self.relative(path)));
    }

    fn build_complete(&self, executed: usize, up_to_date: usize) {
        if executed == 0 {
            Self::line(&format!("Nothing to do: {up_to_date} up to date"));
        } else {
            Self::line(&format!(
                "Build complete: {executed} rebuilt, {up_to_date} up to date"
            ));
        }
    }
}

/// Silent reporter: emits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl StatusReporter for SilentReporter {
    fn directory_created(&self, _directory: &Utf8Path) {}
    fn action_started(&self, _kind: ActionKind, _output: &Utf8Path) {}
    fn output_removed(&self, _path: &Utf8Path) {}
    fn build_complete(&self, _executed: usize, _up_to_date: usize) {}
}
