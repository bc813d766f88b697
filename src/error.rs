//! Error taxonomy shared by graph construction, staleness evaluation, and the
//! build scheduler.
//!
//! Every variant is fatal for the current invocation and names the path or
//! declaration the caller has to fix.

// The miette/thiserror derives trip `unused_assignments` on some toolchains
// and not others, so `#[expect]` cannot be used here.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use itertools::Itertools;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

use crate::executor::ExecutionError;

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths.iter().join(", ")
}

fn join_cycle(paths: &[Utf8PathBuf]) -> String {
    paths.iter().join(" -> ")
}

/// Errors raised while constructing or building the dependency graph.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// No file with the requested stem exists under any search root.
    #[error("no source file for `{stem}` found under {}", join_paths(.roots))]
    #[diagnostic(
        code(globuild::locator::not_found),
        help("check the unit name or add the file under one of the source directories")
    )]
    SourceNotFound {
        /// Stem derived from the requested name.
        stem: String,
        /// Search roots that were scanned.
        roots: Vec<Utf8PathBuf>,
    },

    /// Several files share the requested stem.
    #[error("ambiguous source for `{stem}`: {}", join_paths(.candidates))]
    #[diagnostic(
        code(globuild::locator::ambiguous),
        help("rename one of the candidates so each stem is unique")
    )]
    AmbiguousSource {
        /// Stem derived from the requested name.
        stem: String,
        /// Every matching file, sorted.
        candidates: Vec<Utf8PathBuf>,
    },

    /// Walking a search root failed.
    #[error("failed to search {root} for sources")]
    #[diagnostic(code(globuild::locator::search))]
    SourceSearchFailed {
        /// Search root being walked.
        root: Utf8PathBuf,
        /// Traversal error.
        #[source]
        source: walkdir::Error,
    },

    /// A source located during graph construction has vanished.
    #[error("source file is missing: {path}")]
    #[diagnostic(code(globuild::staleness::source_missing))]
    SourceMissing {
        /// Expected source path.
        path: Utf8PathBuf,
    },

    /// Two declarations or derived nodes claim the same output path.
    #[error("duplicate artifact {path}: {reason}")]
    #[diagnostic(code(globuild::graph::duplicate))]
    DuplicateArtifact {
        /// Contested output path.
        path: Utf8PathBuf,
        /// What collided.
        reason: String,
    },

    /// An artifact declaration has an invalid shape.
    #[error("invalid declaration `{name}`: {reason}")]
    #[diagnostic(code(globuild::graph::invalid_declaration))]
    InvalidDeclaration {
        /// Declared artifact or input name.
        name: String,
        /// Why the declaration was refused.
        reason: String,
    },

    /// A requested build target is not part of the graph.
    #[error("unknown target `{name}`")]
    #[diagnostic(
        code(globuild::scheduler::unknown_target),
        help("targets are artifact names or node paths relative to the project root")
    )]
    UnknownTarget {
        /// Target as requested.
        name: String,
    },

    /// An output path is occupied by something the build cannot own.
    #[error("output path conflict at {path}: {reason}")]
    #[diagnostic(code(globuild::graph::output_conflict))]
    OutputPathConflict {
        /// Conflicting path.
        path: Utf8PathBuf,
        /// What occupies the path.
        reason: String,
    },

    /// The dependency relation contains a cycle.
    #[error("dependency cycle detected: {}", join_cycle(.cycle))]
    #[diagnostic(code(globuild::graph::cycle))]
    CycleDetected {
        /// Node paths along the cycle; the first path is repeated at the end.
        cycle: Vec<Utf8PathBuf>,
    },

    /// File metadata needed for a staleness decision could not be read.
    #[error("cannot read metadata for {path}")]
    #[diagnostic(code(globuild::staleness::metadata))]
    MetadataUnavailable {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The output directory for a node could not be created.
    #[error("cannot create directory {directory} for {path}")]
    #[diagnostic(code(globuild::scheduler::directory))]
    DirectoryCreationFailed {
        /// Directory that was requested.
        directory: Utf8PathBuf,
        /// Node whose output lives there.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The action executor failed to produce a node.
    #[error("building {path} failed")]
    #[diagnostic(code(globuild::scheduler::execution))]
    ExecutionFailed {
        /// Node being produced.
        path: Utf8PathBuf,
        /// Executor diagnostic.
        #[source]
        source: ExecutionError,
    },

    /// A derived output could not be removed while cleaning.
    #[error("cannot remove {path}")]
    #[diagnostic(code(globuild::clean::remove))]
    RemoveFailed {
        /// Output being removed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
