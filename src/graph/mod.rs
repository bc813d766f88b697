//! Dependency graph of sources, compiled units, and artifacts.
//!
//! Nodes live in an arena owned by [`BuildGraph`] and refer to each other by
//! [`NodeId`]. Kind-specific dependencies are carried by the [`NodeKind`]
//! variant, so a compiled unit always has exactly one source and a library
//! always lists its units.
//!
//! # Examples
//!
//! ```
//! use globuild::graph::{ArtifactKind, GraphBuilder};
//! use globuild::{BuildMode, Layout};
//!
//! let dir = tempfile::tempdir().expect("tempdir");
//! let root = camino::Utf8Path::from_path(dir.path()).expect("utf8");
//! std::fs::create_dir_all(root.join("src")).expect("mkdir");
//! std::fs::write(root.join("src/llist.c"), "").expect("write");
//!
//! let mut builder = GraphBuilder::new(Layout::new(root), BuildMode::Debug);
//! builder
//!     .add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])
//!     .expect("declare");
//! let graph = builder.finish().expect("graph");
//! assert_eq!(graph.len(), 3);
//! ```

mod builder;
mod cycle;

pub use builder::{ArtifactDecl, ArtifactKind, GraphBuilder};
pub(crate) use cycle::topological_order;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::error::BuildError;
use crate::mode::BuildMode;

/// Stable index of a node inside one [`BuildGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// What a node is, together with the inputs it is produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A file authored by hand; never produced by an action.
    Source,
    /// An object compiled from exactly one source.
    CompiledUnit {
        /// The source file.
        source: NodeId,
    },
    /// An archive of compiled units.
    StaticLibrary {
        /// Archive members in declaration order.
        units: Vec<NodeId>,
    },
    /// A shared object linked from compiled units and other libraries.
    SharedLibrary {
        /// Linked units in declaration order.
        units: Vec<NodeId>,
        /// Libraries linked after the units.
        links: Vec<NodeId>,
    },
    /// A program linked from units, sources, and libraries.
    Executable {
        /// Link inputs in declaration order.
        inputs: Vec<NodeId>,
    },
}

impl NodeKind {
    /// Human readable name of the kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::CompiledUnit { .. } => "compiled unit",
            Self::StaticLibrary { .. } => "static library",
            Self::SharedLibrary { .. } => "shared library",
            Self::Executable { .. } => "executable",
        }
    }
}

/// One artifact or source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    path: Utf8PathBuf,
    kind: NodeKind,
}

impl Node {
    /// Create a node for `path`.
    #[must_use]
    pub const fn new(path: Utf8PathBuf, kind: NodeKind) -> Self {
        Self { path, kind }
    }

    /// On-disk location the node represents.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Kind-specific data.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// True for hand-written sources.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self.kind, NodeKind::Source)
    }

    /// Inputs in the order they are handed to the toolchain.
    pub fn dependencies(&self) -> impl Iterator<Item = NodeId> + '_ {
        let (head, tail): (&[NodeId], &[NodeId]) = match &self.kind {
            NodeKind::Source => (&[], &[]),
            NodeKind::CompiledUnit { source } => (std::slice::from_ref(source), &[]),
            NodeKind::StaticLibrary { units } => (units, &[]),
            NodeKind::SharedLibrary { units, links } => (units, links),
            NodeKind::Executable { inputs } => (inputs, &[]),
        };
        head.iter().chain(tail).copied()
    }
}

/// Arena of nodes for one build invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
    root: Utf8PathBuf,
    mode: BuildMode,
    nodes: Vec<Node>,
    by_path: IndexMap<Utf8PathBuf, NodeId>,
    artifacts: IndexMap<String, NodeId>,
}

impl BuildGraph {
    /// Create an empty graph for a project rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, mode: BuildMode) -> Self {
        Self {
            root: root.into(),
            mode,
            ..Self::default()
        }
    }

    /// Project root used for display paths.
    #[must_use]
    pub fn root_dir(&self) -> &Utf8Path {
        &self.root
    }

    /// Build mode the graph's output paths were derived for.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "node ids are only issued by this arena"
    )]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Iterate over nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// Look a node up by its exact path.
    #[must_use]
    pub fn lookup(&self, path: &Utf8Path) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Look a declared artifact up by name.
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<NodeId> {
        self.artifacts.get(name).copied()
    }

    /// Declared artifacts, in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.artifacts.values().copied()
    }

    /// Path of `id` relative to the project root when possible.
    #[must_use]
    pub fn display_path(&self, id: NodeId) -> &Utf8Path {
        let path = self.node(id).path();
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Dependency paths of `id`, in toolchain order.
    #[must_use]
    pub fn dependency_paths(&self, id: NodeId) -> Vec<&Utf8Path> {
        self.node(id)
            .dependencies()
            .map(|dep| self.node(dep).path())
            .collect()
    }

    /// Append `node`, rejecting a second node for the same path.
    pub(crate) fn push(&mut self, node: Node) -> Result<NodeId, BuildError> {
        if let Some(existing) = self.lookup(&node.path) {
            return Err(BuildError::DuplicateArtifact {
                path: node.path,
                reason: format!(
                    "already produced as a {}",
                    self.node(existing).kind().label()
                ),
            });
        }
        let id = NodeId(self.nodes.len());
        self.by_path.insert(node.path.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Record `id` as the node for the artifact called `name`.
    pub(crate) fn register_artifact(&mut self, name: &str, id: NodeId) {
        self.artifacts.insert(name.to_owned(), id);
    }
}
