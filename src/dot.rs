//! Graphviz export of a [`BuildGraph`].
//!
//! Nodes are listed in arena order with their root-relative paths as labels,
//! followed by one edge per dependency, so identical graphs render
//! identically.

use std::fmt::{self, Display, Formatter, Write};

use crate::graph::{BuildGraph, NodeId};

/// Render `graph` as a DOT `digraph`.
///
/// # Errors
///
/// Returns [`fmt::Error`] if formatting fails.
///
/// ```
/// use globuild::{BuildMode, graph::BuildGraph};
/// let dot = globuild::dot::generate(&BuildGraph::new("/work", BuildMode::Debug)).expect("dot");
/// assert_eq!(dot, "digraph {\n}\n");
/// ```
pub fn generate(graph: &BuildGraph) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "digraph {{")?;
    for (id, _) in graph.nodes() {
        write!(out, "{}", DisplayNode { graph, id })?;
    }
    for (id, node) in graph.nodes() {
        for dep in node.dependencies() {
            writeln!(out, "  n{} -> n{}", id.index(), dep.index())?;
        }
    }
    writeln!(out, "}}")?;
    Ok(out)
}

struct DisplayNode<'a> {
    graph: &'a BuildGraph,
    id: NodeId,
}

impl Display for DisplayNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "  n{} [label=\"", self.id.index())?;
        for ch in self.graph.display_path(self.id).as_str().chars() {
            if matches!(ch, '"' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(ch)?;
        }
        writeln!(f, "\"]")
    }
}
