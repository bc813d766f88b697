//! Error types for the runner module.
//!
//! Kept in their own file so the derive-macro lint suppression stays narrow.

// The unused_assignments lint from the miette/thiserror derives fires in some
// Rust versions but not others, so `#[expect]` cannot be used here.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Errors raised while preparing a command.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The manifest file does not exist at the expected path.
    #[error("no manifest found at {path}")]
    #[diagnostic(
        code(globuild::runner::manifest_not_found),
        help("create a Globuildfile or point at one with -f/--file and -C/--directory")
    )]
    ManifestNotFound {
        /// The path that was attempted.
        path: Utf8PathBuf,
    },

    /// The project directory cannot be resolved.
    #[error("cannot use {path} as the project directory")]
    #[diagnostic(code(globuild::runner::project_dir))]
    ProjectDirectory {
        /// Directory as given.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A command-line path is not valid UTF-8.
    #[error("path {path} is not valid UTF-8")]
    #[diagnostic(code(globuild::runner::non_utf8))]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },
}
