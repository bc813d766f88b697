//! Globuild core library.
//!
//! Artifacts are declared by name; their sources are found by searching the
//! project's source directories, assembled into a dependency graph, and
//! rebuilt in dependency order whenever an input is newer than its output.
//!
//! ```no_run
//! use globuild::executor::{Toolchain, ToolchainExecutor};
//! use globuild::graph::{ArtifactKind, GraphBuilder};
//! use globuild::{BuildMode, Layout};
//!
//! let mut builder = GraphBuilder::new(Layout::new("/work/project"), BuildMode::Debug);
//! builder
//!     .add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o", "vector.o"])
//!     .expect("valid declaration");
//! let mut executor = ToolchainExecutor::new(Toolchain::default());
//! let report = globuild::build(&builder, &mut executor).expect("build");
//! println!("{} actions", report.executed.len());
//! ```

pub mod ast;
pub mod clean;
pub mod cli;
pub mod dot;
pub mod error;
pub mod executor;
pub mod graph;
pub mod layout;
pub mod locator;
pub mod manifest;
pub mod mode;
pub mod runner;
pub mod scheduler;
pub mod staleness;
pub mod status;

pub use error::BuildError;
pub use layout::Layout;
pub use mode::BuildMode;
pub use scheduler::{BuildReport, BuildScheduler};

use executor::ActionExecutor;
use graph::GraphBuilder;

/// Assemble a fresh graph from `builder` and bring every artifact up to date.
///
/// # Errors
///
/// Returns the first [`BuildError`] from graph construction or the build.
pub fn build(
    builder: &GraphBuilder,
    executor: &mut dyn ActionExecutor,
) -> Result<BuildReport, BuildError> {
    let graph = builder.finish()?;
    BuildScheduler::new(&graph).run(executor)
}
