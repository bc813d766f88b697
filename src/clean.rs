//! Removal of derived outputs.

use std::fs;
use std::io::ErrorKind;

use camino::Utf8PathBuf;
use tracing::debug;

use crate::error::BuildError;
use crate::graph::BuildGraph;
use crate::status::StatusReporter;

/// Delete every existing compiled unit and artifact in `graph`.
///
/// Sources are never touched and missing outputs are skipped. Returns the
/// paths that were removed, in arena order.
///
/// # Errors
///
/// Returns [`BuildError::RemoveFailed`] for the first output that exists but
/// cannot be deleted.
pub fn remove_outputs(
    graph: &BuildGraph,
    reporter: &dyn StatusReporter,
) -> Result<Vec<Utf8PathBuf>, BuildError> {
    let mut removed = Vec::new();
    for (_, node) in graph.nodes().filter(|(_, node)| !node.is_source()) {
        match fs::remove_file(node.path()) {
            Ok(()) => {
                reporter.output_removed(node.path());
                removed.push(node.path().to_path_buf());
            }
            Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                debug!(path = %node.path(), "nothing to remove");
            }
            Err(source) => {
                return Err(BuildError::RemoveFailed {
                    path: node.path().to_path_buf(),
                    source,
                });
            }
        }
    }
    Ok(removed)
}
