//! Ordered execution of stale nodes.
//!
//! The scheduler walks the graph depth-first from the requested roots,
//! consults a fresh [`StalenessEvaluator`] for every derived node, and hands
//! stale ones to an [`ActionExecutor`] one at a time. The first failure stops
//! the build.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::BuildError;
use crate::executor::{ActionExecutor, ActionKind, ActionRequest, ExecutionError};
use crate::graph::{BuildGraph, NodeId, topological_order};
use crate::staleness::StalenessEvaluator;
use crate::status::{SilentReporter, StatusReporter};

mod dirs;

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Outputs produced, in execution order.
    pub executed: Vec<Utf8PathBuf>,
    /// Derived outputs that were already current.
    pub up_to_date: Vec<Utf8PathBuf>,
    /// Directories created to hold outputs.
    pub created_directories: Vec<Utf8PathBuf>,
}

/// Drives a [`BuildGraph`] to an up-to-date state.
pub struct BuildScheduler<'a> {
    graph: &'a BuildGraph,
    reporter: &'a dyn StatusReporter,
}

impl<'a> BuildScheduler<'a> {
    /// Schedule `graph` without progress output.
    #[must_use]
    pub const fn new(graph: &'a BuildGraph) -> Self {
        Self {
            graph,
            reporter: &SilentReporter,
        }
    }

    /// Send progress events to `reporter`.
    #[must_use]
    pub const fn with_reporter(mut self, reporter: &'a dyn StatusReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Map target names to nodes.
    ///
    /// A target is a declared artifact name or a node path relative to the
    /// project root. No targets selects every declared artifact.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownTarget`] for names matching neither.
    pub fn resolve_targets<S: AsRef<str>>(
        &self,
        targets: &[S],
    ) -> Result<Vec<NodeId>, BuildError> {
        if targets.is_empty() {
            return Ok(self.graph.roots().collect());
        }
        targets
            .iter()
            .map(|target| {
                let name = target.as_ref();
                self.graph
                    .artifact(name)
                    .or_else(|| self.graph.lookup(&self.graph.root_dir().join(name)))
                    .or_else(|| self.graph.lookup(Utf8Path::new(name)))
                    .ok_or_else(|| BuildError::UnknownTarget {
                        name: name.to_owned(),
                    })
            })
            .collect()
    }

    /// Nodes reachable from `roots`, each after its dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CycleDetected`] if the reachable subgraph is
    /// cyclic.
    pub fn order(
        &self,
        roots: impl IntoIterator<Item = NodeId>,
    ) -> Result<Vec<NodeId>, BuildError> {
        topological_order(self.graph, roots).map_err(|cycle| BuildError::CycleDetected { cycle })
    }

    /// Bring every declared artifact up to date.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] encountered; nothing after it runs.
    pub fn run(&self, executor: &mut dyn ActionExecutor) -> Result<BuildReport, BuildError> {
        self.run_targets::<&str>(&[], executor)
    }

    /// Bring `targets` and their dependencies up to date.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] encountered; nothing after it runs.
    pub fn run_targets<S: AsRef<str>>(
        &self,
        targets: &[S],
        executor: &mut dyn ActionExecutor,
    ) -> Result<BuildReport, BuildError> {
        let graph = self.graph;
        let order = self.order(self.resolve_targets(targets)?)?;
        let mut staleness = StalenessEvaluator::new(graph);
        let mut report = BuildReport::default();

        for id in order {
            let node = graph.node(id);
            let Some(kind) = ActionKind::for_node(node.kind()) else {
                continue;
            };
            if !staleness.is_stale(id)? {
                debug!(node = %graph.display_path(id), "up to date");
                report.up_to_date.push(node.path().to_path_buf());
                continue;
            }

            if let Some(directory) = dirs::ensure_parent_dir(node.path())? {
                self.reporter.directory_created(&directory);
                report.created_directories.push(directory);
            }

            let inputs = graph.dependency_paths(id);
            let request = ActionRequest {
                kind,
                output: node.path(),
                inputs: &inputs,
                mode: graph.mode(),
            };
            self.reporter.action_started(kind, node.path());
            executor
                .execute(&request)
                .map_err(|source| BuildError::ExecutionFailed {
                    path: node.path().to_path_buf(),
                    source,
                })?;
            ensure_produced(node.path())?;

            staleness.mark_rebuilt(id);
            report.executed.push(node.path().to_path_buf());
        }

        self.reporter
            .build_complete(report.executed.len(), report.up_to_date.len());
        Ok(report)
    }

    /// Nodes a build of `targets` would produce, in execution order.
    ///
    /// Only metadata is read. Each stale node counts as rebuilt for its
    /// dependents.
    ///
    /// # Errors
    ///
    /// Returns target, cycle, and staleness errors as [`BuildScheduler::run_targets`]
    /// would.
    pub fn plan<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<NodeId>, BuildError> {
        let order = self.order(self.resolve_targets(targets)?)?;
        let mut staleness = StalenessEvaluator::new(self.graph);
        let mut stale = Vec::new();
        for id in order {
            if self.graph.node(id).is_source() {
                continue;
            }
            if staleness.is_stale(id)? {
                staleness.mark_rebuilt(id);
                stale.push(id);
            }
        }
        Ok(stale)
    }
}

fn ensure_produced(path: &Utf8Path) -> Result<(), BuildError> {
    if fs::metadata(path).is_ok_and(|meta| meta.is_file()) {
        return Ok(());
    }
    Err(BuildError::ExecutionFailed {
        path: path.to_path_buf(),
        source: ExecutionError::MissingOutput {
            path: path.to_path_buf(),
        },
    })
}
