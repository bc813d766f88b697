//! Topological ordering with cycle detection for the build graph.

use camino::Utf8PathBuf;

use super::{BuildGraph, NodeId};

/// Tracks the visitation state of a node during traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Order the nodes reachable from `roots` so each follows its dependencies.
///
/// Roots are visited in the given order and dependencies in declaration
/// order, so the result is identical for identical graphs. On failure the
/// cycle is returned as canonicalised node paths with the first path repeated
/// at the end.
pub(crate) fn topological_order(
    graph: &BuildGraph,
    roots: impl IntoIterator<Item = NodeId>,
) -> Result<Vec<NodeId>, Vec<Utf8PathBuf>> {
    let mut sorter = TopoSorter::new(graph);
    for root in roots {
        if let Some(cycle) = sorter.visit(root) {
            let paths = cycle
                .into_iter()
                .map(|id| graph.node(id).path().to_path_buf())
                .collect();
            return Err(canonicalize_cycle(paths));
        }
    }
    Ok(sorter.order)
}

struct TopoSorter<'a> {
    graph: &'a BuildGraph,
    states: Vec<Option<VisitState>>,
    stack: Vec<NodeId>,
    order: Vec<NodeId>,
}

impl<'a> TopoSorter<'a> {
    fn new(graph: &'a BuildGraph) -> Self {
        Self {
            graph,
            states: vec![None; graph.len()],
            stack: Vec::new(),
            order: Vec::with_capacity(graph.len()),
        }
    }

    fn state(&self, node: NodeId) -> Option<VisitState> {
        self.states.get(node.index()).copied().flatten()
    }

    fn set_state(&mut self, node: NodeId, state: VisitState) {
        if let Some(slot) = self.states.get_mut(node.index()) {
            *slot = Some(state);
        }
    }

    fn visit(&mut self, node: NodeId) -> Option<Vec<NodeId>> {
        match self.state(node) {
            Some(VisitState::Visited) => return None,
            Some(VisitState::Visiting) => {
                let idx = self
                    .stack
                    .iter()
                    .position(|n| *n == node)
                    .unwrap_or_else(|| {
                        debug_assert!(false, "visiting node must be on the stack");
                        0
                    });
                let mut cycle: Vec<NodeId> = self.stack.iter().skip(idx).copied().collect();
                cycle.push(node);
                return Some(cycle);
            }
            None => self.set_state(node, VisitState::Visiting),
        }

        self.stack.push(node);
        let graph = self.graph;
        for dep in graph.node(node).dependencies() {
            if let Some(cycle) = self.visit(dep) {
                return Some(cycle);
            }
        }
        self.stack.pop();

        self.set_state(node, VisitState::Visited);
        self.order.push(node);
        None
    }
}

fn canonicalize_cycle(mut cycle: Vec<Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    if cycle.len() < 2 {
        return cycle;
    }
    let len = cycle.len() - 1;
    let start = cycle
        .iter()
        .take(len)
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    let (prefix, suffix) = cycle.split_at_mut(len);
    prefix.rotate_left(start);
    if let (Some(first), Some(slot)) = (prefix.first().cloned(), suffix.first_mut()) {
        slot.clone_from(&first);
    }
    cycle
}
