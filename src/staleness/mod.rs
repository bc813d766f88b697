//! Timestamp-based staleness decisions.
//!
//! A node is stale when its output is missing or when any dependency is
//! stale, was rebuilt, or carries a modification time strictly newer than the
//! node's own. Decisions are memoised for the lifetime of one evaluator, so a
//! compiled unit shared by several artifacts is examined once.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::time::SystemTime;

use tracing::debug;

use crate::error::BuildError;
use crate::graph::{BuildGraph, NodeId};

/// Memoised state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The output exists and is at least as new as every input.
    Fresh(SystemTime),
    /// The output must be produced.
    Stale,
    /// The output was produced during this invocation.
    Rebuilt,
}

impl Freshness {
    /// True when dependents must treat this node as newer than themselves.
    #[must_use]
    pub const fn forces_dependents(self) -> bool {
        matches!(self, Self::Stale | Self::Rebuilt)
    }
}

/// Staleness evaluator for one build invocation.
#[derive(Debug)]
pub struct StalenessEvaluator<'g> {
    graph: &'g BuildGraph,
    cache: HashMap<NodeId, Freshness>,
}

impl<'g> StalenessEvaluator<'g> {
    /// Create an evaluator with an empty cache.
    #[must_use]
    pub fn new(graph: &'g BuildGraph) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
        }
    }

    /// Decide whether `id` must be (re)produced.
    ///
    /// Sources are never stale. Every dependency is evaluated, even once the
    /// answer is known, so the cache is complete for the whole subtree.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SourceMissing`] when a source has vanished,
    /// [`BuildError::MetadataUnavailable`] when a timestamp cannot be read, and
    /// [`BuildError::OutputPathConflict`] when an output path holds something
    /// other than a regular file.
    pub fn is_stale(&mut self, id: NodeId) -> Result<bool, BuildError> {
        Ok(self.evaluate(id)? == Freshness::Stale)
    }

    /// Record that `id` has just been produced.
    pub fn mark_rebuilt(&mut self, id: NodeId) {
        self.cache.insert(id, Freshness::Rebuilt);
    }

    /// Memoised state of `id`, if it has been evaluated.
    #[must_use]
    pub fn state(&self, id: NodeId) -> Option<Freshness> {
        self.cache.get(&id).copied()
    }

    fn evaluate(&mut self, id: NodeId) -> Result<Freshness, BuildError> {
        if let Some(state) = self.state(id) {
            return Ok(state);
        }
        let graph = self.graph;
        let node = graph.node(id);

        let state = if node.is_source() {
            Freshness::Fresh(source_mtime(graph, id)?)
        } else {
            let mut dep_states = Vec::new();
            for dep in node.dependencies() {
                dep_states.push((dep, self.evaluate(dep)?));
            }
            match output_mtime(graph, id)? {
                None => {
                    debug!(node = %graph.display_path(id), "output missing");
                    Freshness::Stale
                }
                Some(own) => {
                    let newer = dep_states.iter().find(|(_, state)| match *state {
                        Freshness::Fresh(time) => time > own,
                        forced => forced.forces_dependents(),
                    });
                    if let Some((dep, _)) = newer {
                        debug!(
                            node = %graph.display_path(id),
                            dependency = %graph.display_path(*dep),
                            "dependency is newer"
                        );
                        Freshness::Stale
                    } else {
                        Freshness::Fresh(own)
                    }
                }
            }
        };
        self.cache.insert(id, state);
        Ok(state)
    }
}

fn source_mtime(graph: &BuildGraph, id: NodeId) -> Result<SystemTime, BuildError> {
    let path = graph.node(id).path();
    match output_mtime(graph, id) {
        Ok(Some(time)) => Ok(time),
        Ok(None) => Err(BuildError::SourceMissing {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(err),
    }
}

/// Modification time of the file at `id`, or `None` when nothing is there.
fn output_mtime(graph: &BuildGraph, id: NodeId) -> Result<Option<SystemTime>, BuildError> {
    let path = graph.node(id).path();
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        // A file where a parent directory belongs also means no output yet;
        // directory preparation reports the collision.
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(None);
        }
        Err(source) => {
            return Err(BuildError::MetadataUnavailable {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if !meta.is_file() {
        return Err(BuildError::OutputPathConflict {
            path: path.to_path_buf(),
            reason: "expected a regular file".to_owned(),
        });
    }
    meta.modified()
        .map(Some)
        .map_err(|source| BuildError::MetadataUnavailable {
            path: path.to_path_buf(),
            source,
        })
}
