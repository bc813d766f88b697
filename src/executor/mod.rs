//! The seam between the scheduler and whatever produces build outputs.
//!
//! The scheduler hands every stale node to an [`ActionExecutor`] as an
//! [`ActionRequest`]. [`ToolchainExecutor`] runs the configured compiler and
//! archiver; tests substitute recording executors.

use std::io;
use std::process::ExitStatus;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::graph::NodeKind;
use crate::mode::BuildMode;

mod process;
mod toolchain;

pub use toolchain::{CommandLine, Toolchain, ToolchainExecutor};

/// Action needed to produce a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Compile one source into an object.
    Compile,
    /// Archive objects into a static library.
    Archive,
    /// Link a shared library.
    LinkShared,
    /// Link an executable.
    LinkExecutable,
}

impl ActionKind {
    /// Action for nodes of `kind`; sources have none.
    #[must_use]
    pub const fn for_node(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Source => None,
            NodeKind::CompiledUnit { .. } => Some(Self::Compile),
            NodeKind::StaticLibrary { .. } => Some(Self::Archive),
            NodeKind::SharedLibrary { .. } => Some(Self::LinkShared),
            NodeKind::Executable { .. } => Some(Self::LinkExecutable),
        }
    }

    /// Verb used in progress output.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Compile => "Compiling",
            Self::Archive => "Archiving",
            Self::LinkShared | Self::LinkExecutable => "Linking",
        }
    }
}

/// Everything an executor needs to produce one output.
#[derive(Debug, Clone, Copy)]
pub struct ActionRequest<'a> {
    /// What to do.
    pub kind: ActionKind,
    /// File to produce.
    pub output: &'a Utf8Path,
    /// Input files in dependency order.
    pub inputs: &'a [&'a Utf8Path],
    /// Build mode selecting flags.
    pub mode: BuildMode,
}

/// Produces build outputs.
pub trait ActionExecutor {
    /// Produce `request.output` from `request.inputs`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] when the output could not be produced.
    fn execute(&mut self, request: &ActionRequest<'_>) -> Result<(), ExecutionError>;
}

/// Failure reported by an [`ActionExecutor`].
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The program could not be started.
    #[error("failed to start `{program}`")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The program ran and reported failure.
    #[error("`{command}` failed with {status}\n{diagnostic}")]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status.
        status: ExitStatus,
        /// Captured diagnostic output, verbatim.
        diagnostic: String,
    },

    /// The action succeeded but left no output file behind.
    #[error("action produced no output at {path}")]
    MissingOutput {
        /// Expected output path.
        path: Utf8PathBuf,
    },

    /// The executor refused the request.
    #[error("{message}")]
    Rejected {
        /// Explanation.
        message: String,
    },
}
