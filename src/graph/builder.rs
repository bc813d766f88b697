//! Declaration-to-graph conversion.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BuildGraph, Node, NodeId, NodeKind, cycle::topological_order};
use crate::ast::GlobuildManifest;
use crate::error::BuildError;
use crate::layout::Layout;
use crate::locator::{SourceLocator, SourceLookup};
use crate::mode::BuildMode;

/// Kinds of artifact a caller may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Archive of compiled units.
    StaticLibrary,
    /// Shared object linked from compiled units and libraries.
    SharedLibrary,
    /// Program linked from units, sources, and libraries.
    Executable,
}

/// An artifact as declared by the caller, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDecl {
    /// Output name, relative to the artifact directory.
    pub name: String,
    /// What the artifact is.
    pub kind: ArtifactKind,
    /// Input names in declaration order.
    pub inputs: Vec<String>,
}

/// Collects artifact declarations and assembles them into a [`BuildGraph`].
///
/// Declarations are validated as they arrive; sources are located when the
/// graph is assembled by [`GraphBuilder::finish`], which may be called once
/// per build invocation.
pub struct GraphBuilder {
    layout: Layout,
    mode: BuildMode,
    locator: Box<dyn SourceLookup>,
    decls: IndexMap<String, ArtifactDecl>,
}

impl fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("layout", &self.layout)
            .field("mode", &self.mode)
            .field("decls", &self.decls)
            .finish_non_exhaustive()
    }
}

impl GraphBuilder {
    /// Create a builder that locates sources by walking `layout`.
    #[must_use]
    pub fn new(layout: Layout, mode: BuildMode) -> Self {
        let locator = SourceLocator::new(layout.clone());
        Self::with_locator(layout, mode, locator)
    }

    /// Create a builder with a custom source lookup.
    #[must_use]
    pub fn with_locator(
        layout: Layout,
        mode: BuildMode,
        locator: impl SourceLookup + 'static,
    ) -> Self {
        Self {
            layout,
            mode,
            locator: Box::new(locator),
            decls: IndexMap::new(),
        }
    }

    /// Declare every artifact listed in `manifest`.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] raised by [`GraphBuilder::add_artifact`].
    pub fn from_manifest(
        manifest: &GlobuildManifest,
        root: impl Into<Utf8PathBuf>,
        mode: BuildMode,
    ) -> Result<Self, BuildError> {
        let mut builder = Self::new(Layout::from_config(root, &manifest.layout), mode);
        for artifact in &manifest.artifacts {
            builder.add_artifact(
                artifact.name.clone(),
                artifact.kind,
                artifact.inputs.iter().cloned(),
            )?;
        }
        Ok(builder)
    }

    /// Declarations in the order they were added.
    pub fn declarations(&self) -> impl Iterator<Item = &ArtifactDecl> {
        self.decls.values()
    }

    /// Declare an artifact called `name` built from `inputs`.
    ///
    /// Redeclaring an artifact with an identical definition is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidDeclaration`] for malformed names or input
    /// lists and [`BuildError::DuplicateArtifact`] when `name` was already
    /// declared differently.
    pub fn add_artifact<I, S>(
        &mut self,
        name: impl Into<String>,
        kind: ArtifactKind,
        inputs: I,
    ) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let decl = ArtifactDecl {
            name: name.into(),
            kind,
            inputs: inputs.into_iter().map(Into::into).collect(),
        };
        validate_declaration(&decl)?;

        match self.decls.get(&decl.name) {
            Some(existing) if *existing == decl => {
                debug!(artifact = %decl.name, "ignoring identical redeclaration");
                Ok(())
            }
            Some(_) => Err(BuildError::DuplicateArtifact {
                path: self.layout.artifact_path(decl.kind, &decl.name, self.mode),
                reason: format!("`{}` is declared twice with different definitions", decl.name),
            }),
            None => {
                self.decls.insert(decl.name.clone(), decl);
                Ok(())
            }
        }
    }

    /// Resolve every declaration and assemble a fresh graph.
    ///
    /// # Errors
    ///
    /// Propagates locator failures and returns [`BuildError::InvalidDeclaration`],
    /// [`BuildError::DuplicateArtifact`], [`BuildError::OutputPathConflict`], or
    /// [`BuildError::CycleDetected`] when the declarations cannot form a valid
    /// graph.
    pub fn finish(&self) -> Result<BuildGraph, BuildError> {
        let mut assembly = Assembly {
            builder: self,
            graph: BuildGraph::new(self.layout.root(), self.mode),
            units: HashMap::new(),
            sources: HashMap::new(),
        };

        let mut resolved = Vec::with_capacity(self.decls.len());
        for decl in self.decls.values() {
            let inputs = decl
                .inputs
                .iter()
                .map(|input| assembly.resolve_input(input))
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push(inputs);
        }

        // Artifact ids follow every source and unit, in declaration order, so
        // references between artifacts can be made before both exist.
        let base = assembly.graph.len();
        for (decl, inputs) in self.decls.values().zip(resolved) {
            let kind = self.artifact_kind(decl, &inputs, &assembly.graph, base)?;
            let path = self.layout.artifact_path(decl.kind, &decl.name, self.mode);
            ensure_output_slot(&path)?;
            let id = assembly.graph.push(Node::new(path, kind))?;
            assembly.graph.register_artifact(&decl.name, id);
        }

        let graph = assembly.graph;
        topological_order(&graph, graph.roots())
            .map_err(|cycle| BuildError::CycleDetected { cycle })?;
        debug!(nodes = graph.len(), "assembled build graph");
        Ok(graph)
    }

    fn artifact_kind(
        &self,
        decl: &ArtifactDecl,
        inputs: &[Input],
        graph: &BuildGraph,
        base: usize,
    ) -> Result<NodeKind, BuildError> {
        let invalid = |reason: String| BuildError::InvalidDeclaration {
            name: decl.name.clone(),
            reason,
        };

        let mut units = Vec::new();
        let mut libraries = Vec::new();
        let mut ordered = Vec::with_capacity(inputs.len());
        let mut first_source = None;
        for (input, name) in inputs.iter().zip(&decl.inputs) {
            let id = match *input {
                Input::Node(id) => {
                    if graph.node(id).is_source() {
                        first_source.get_or_insert(name);
                    } else {
                        units.push(id);
                    }
                    id
                }
                Input::Artifact(index) => {
                    let dep_kind = self.decls.get_index(index).map(|(_, dep)| dep.kind);
                    if dep_kind == Some(ArtifactKind::Executable) {
                        return Err(invalid(format!("cannot link against executable `{name}`")));
                    }
                    let id = NodeId(base + index);
                    libraries.push(id);
                    id
                }
            };
            ordered.push(id);
        }

        match decl.kind {
            ArtifactKind::StaticLibrary => {
                if let Some(source) = first_source {
                    return Err(invalid(format!(
                        "static library inputs must be compiled units, `{source}` is a source"
                    )));
                }
                if let Some(lib) = libraries.first() {
                    return Err(invalid(format!(
                        "static libraries cannot contain `{}`",
                        graph_name(self, *lib, base)
                    )));
                }
                if units.is_empty() {
                    return Err(invalid("needs at least one compiled unit".to_owned()));
                }
                Ok(NodeKind::StaticLibrary { units })
            }
            ArtifactKind::SharedLibrary => {
                if let Some(source) = first_source {
                    return Err(invalid(format!(
                        "shared library inputs must be compiled units or libraries, `{source}` is a source"
                    )));
                }
                if units.is_empty() {
                    return Err(invalid("needs at least one compiled unit".to_owned()));
                }
                Ok(NodeKind::SharedLibrary {
                    units,
                    links: libraries,
                })
            }
            ArtifactKind::Executable => Ok(NodeKind::Executable { inputs: ordered }),
        }
    }
}

fn graph_name(builder: &GraphBuilder, id: NodeId, base: usize) -> &str {
    id.index()
        .checked_sub(base)
        .and_then(|index| builder.decls.get_index(index))
        .map_or("?", |(name, _)| name.as_str())
}

/// A declaration input after classification.
#[derive(Debug, Clone, Copy)]
enum Input {
    Node(NodeId),
    Artifact(usize),
}

/// Working state while a graph is assembled.
struct Assembly<'a> {
    builder: &'a GraphBuilder,
    graph: BuildGraph,
    units: HashMap<String, NodeId>,
    sources: HashMap<String, NodeId>,
}

impl Assembly<'_> {
    fn resolve_input(&mut self, name: &str) -> Result<Input, BuildError> {
        if let Some(index) = self.builder.decls.get_index_of(name) {
            return Ok(Input::Artifact(index));
        }
        if self.builder.layout.is_source_name(name) {
            return self.direct_source(name).map(Input::Node);
        }
        self.compiled_unit(name).map(Input::Node)
    }

    fn direct_source(&mut self, name: &str) -> Result<NodeId, BuildError> {
        if let Some(id) = self.sources.get(name) {
            return Ok(*id);
        }
        let located = self.builder.locator.locate(name)?;
        let id = self.source_node(&located.path)?;
        self.sources.insert(name.to_owned(), id);
        Ok(id)
    }

    fn compiled_unit(&mut self, name: &str) -> Result<NodeId, BuildError> {
        if let Some(id) = self.units.get(name) {
            return Ok(*id);
        }
        let located = self.builder.locator.locate(name)?;
        let source = self.source_node(&located.path)?;
        let object = self
            .builder
            .layout
            .object_path(&located.path, &located.root, self.builder.mode);
        let kind = NodeKind::CompiledUnit { source };
        let id = match self.graph.lookup(&object) {
            Some(existing) if *self.graph.node(existing).kind() == kind => existing,
            _ => self.graph.push(Node::new(object, kind))?,
        };
        debug!(
            unit = name,
            source = %located.path,
            object = %self.graph.node(id).path(),
            "resolved compiled unit"
        );
        self.units.insert(name.to_owned(), id);
        Ok(id)
    }

    fn source_node(&mut self, path: &Utf8Path) -> Result<NodeId, BuildError> {
        match self.graph.lookup(path) {
            Some(id) if self.graph.node(id).is_source() => Ok(id),
            _ => self
                .graph
                .push(Node::new(path.to_path_buf(), NodeKind::Source)),
        }
    }
}

fn validate_declaration(decl: &ArtifactDecl) -> Result<(), BuildError> {
    let invalid = |name: &str, reason: &str| BuildError::InvalidDeclaration {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };

    let path = Utf8Path::new(&decl.name);
    let plain = !decl.name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Utf8Component::Normal(_)));
    if !plain {
        return Err(invalid(
            &decl.name,
            "artifact names must be relative paths without `.` or `..`",
        ));
    }
    if decl.inputs.is_empty() {
        return Err(invalid(&decl.name, "declares no inputs"));
    }

    let mut seen = HashSet::new();
    for input in &decl.inputs {
        if input.is_empty() || input.contains(['/', '\\']) {
            return Err(invalid(input, "input names must be bare file names"));
        }
        if !seen.insert(input.as_str()) {
            return Err(invalid(
                &decl.name,
                &format!("input `{input}` is listed more than once"),
            ));
        }
    }
    Ok(())
}

/// Reject artifact paths already occupied by something other than a file.
fn ensure_output_slot(path: &Utf8Path) -> Result<(), BuildError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(BuildError::OutputPathConflict {
            path: path.to_path_buf(),
            reason: "an existing non-file entry occupies the artifact path".to_owned(),
        }),
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(()),
        Err(source) => Err(BuildError::MetadataUnavailable {
            path: path.to_path_buf(),
            source,
        }),
    }
}
