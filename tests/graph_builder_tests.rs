//! Graph construction from artifact declarations.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use globuild::BuildError;
use globuild::graph::{ArtifactKind, GraphBuilder, NodeKind};
use globuild::locator::{LocatedSource, SourceLocator, SourceLookup};
use globuild::{BuildMode, Layout};
use rstest::{fixture, rstest};
use test_support::ProjectTree;

#[fixture]
fn ds_tree() -> ProjectTree {
    ProjectTree::with_files(&[
        "src/llist/llist.c",
        "src/vector/vector.c",
        "test/test_llist.c",
    ])
    .expect("project tree")
}

fn builder(tree: &ProjectTree) -> GraphBuilder {
    GraphBuilder::new(tree.layout(), BuildMode::Debug)
}

/// Counts locator calls while delegating to the filesystem search.
struct CountingLocator {
    inner: SourceLocator,
    calls: Rc<Cell<usize>>,
}

impl SourceLookup for CountingLocator {
    fn locate(&self, name: &str) -> Result<LocatedSource, BuildError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.locate(name)
    }
}

#[rstest]
fn static_library_from_two_units(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o", "vector.o"])?;
    let graph = b.finish()?;

    assert_eq!(graph.len(), 5);
    let lib = graph.artifact("libds.a").expect("artifact registered");
    assert_eq!(graph.node(lib).path(), ds_tree.path("bin/libds.a"));
    let NodeKind::StaticLibrary { units } = graph.node(lib).kind() else {
        panic!("expected a static library");
    };
    let unit_paths: Vec<_> = units.iter().map(|id| graph.display_path(*id).to_string()).collect();
    assert_eq!(unit_paths, ["obj/dbg/llist/llist.o", "obj/dbg/vector/vector.o"]);
    Ok(())
}

#[rstest]
fn release_mode_changes_object_paths_only(ds_tree: ProjectTree) -> Result<()> {
    let mut b = GraphBuilder::new(ds_tree.layout(), BuildMode::Release);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let graph = b.finish()?;
    assert!(graph.lookup(&ds_tree.path("obj/rls/llist/llist.o")).is_some());
    assert!(graph.lookup(&ds_tree.path("bin/libds.a")).is_some());
    Ok(())
}

#[rstest]
fn shared_units_are_located_once(ds_tree: ProjectTree) -> Result<()> {
    let calls = Rc::new(Cell::new(0));
    let locator = CountingLocator {
        inner: SourceLocator::new(ds_tree.layout()),
        calls: Rc::clone(&calls),
    };
    let mut b = GraphBuilder::with_locator(ds_tree.layout(), BuildMode::Debug, locator);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o", "vector.o"])?;
    b.add_artifact("libds.so", ArtifactKind::SharedLibrary, ["llist.o", "vector.o"])?;
    let graph = b.finish()?;

    assert_eq!(calls.get(), 2);
    assert_eq!(graph.len(), 6, "two sources, two units, two libraries");
    Ok(())
}

#[rstest]
fn executables_link_sources_and_libraries(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o", "vector.o"])?;
    b.add_artifact("test_llist", ArtifactKind::Executable, ["test_llist.c", "libds.a"])?;
    let graph = b.finish()?;

    let exe = graph.artifact("test_llist").expect("executable");
    assert_eq!(graph.node(exe).path(), ds_tree.path("test/bin/test_llist"));
    let deps: Vec<_> = graph
        .dependency_paths(exe)
        .into_iter()
        .map(|p| ds_tree_relative(&ds_tree, p))
        .collect();
    assert_eq!(deps, ["test/test_llist.c", "bin/libds.a"]);
    Ok(())
}

fn ds_tree_relative(tree: &ProjectTree, path: &camino::Utf8Path) -> String {
    path.strip_prefix(tree.root()).unwrap_or(path).to_string()
}

#[rstest]
fn forward_references_between_artifacts_resolve(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("test_llist", ArtifactKind::Executable, ["test_llist.o", "libds.a"])?;
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let graph = b.finish()?;
    let exe = graph.artifact("test_llist").expect("executable");
    let lib = graph.artifact("libds.a").expect("library");
    assert!(graph.node(exe).dependencies().any(|dep| dep == lib));
    Ok(())
}

#[rstest]
fn identical_redeclaration_is_idempotent(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    assert_eq!(b.declarations().count(), 1);
    Ok(())
}

#[rstest]
fn conflicting_redeclaration_is_rejected(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let err = b
        .add_artifact("libds.a", ArtifactKind::StaticLibrary, ["vector.o"])
        .expect_err("conflict");
    assert!(matches!(err, BuildError::DuplicateArtifact { .. }), "{err:?}");
    Ok(())
}

#[rstest]
#[case::empty_name("", ArtifactKind::StaticLibrary, &["llist.o"])]
#[case::parent_dir("../libds.a", ArtifactKind::StaticLibrary, &["llist.o"])]
#[case::no_inputs("libds.a", ArtifactKind::StaticLibrary, &[])]
#[case::path_input("libds.a", ArtifactKind::StaticLibrary, &["src/llist.o"])]
#[case::repeated_input("libds.a", ArtifactKind::StaticLibrary, &["llist.o", "llist.o"])]
fn malformed_declarations_are_rejected(
    ds_tree: ProjectTree,
    #[case] name: &str,
    #[case] kind: ArtifactKind,
    #[case] inputs: &[&str],
) {
    let err = builder(&ds_tree)
        .add_artifact(name, kind, inputs.iter().copied())
        .expect_err("invalid");
    assert!(matches!(err, BuildError::InvalidDeclaration { .. }), "{err:?}");
}

#[rstest]
#[case::static_lib_with_source(ArtifactKind::StaticLibrary, &["llist.c"])]
#[case::static_lib_of_library(ArtifactKind::StaticLibrary, &["llist.o", "libbase.a"])]
#[case::shared_lib_without_units(ArtifactKind::SharedLibrary, &["libbase.a"])]
fn kind_rules_are_enforced_when_finishing(
    ds_tree: ProjectTree,
    #[case] kind: ArtifactKind,
    #[case] inputs: &[&str],
) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("libbase.a", ArtifactKind::StaticLibrary, ["vector.o"])?;
    b.add_artifact("libtarget", kind, inputs.iter().copied())?;
    let err = b.finish().expect_err("invalid shape");
    assert!(matches!(err, BuildError::InvalidDeclaration { .. }), "{err:?}");
    Ok(())
}

#[rstest]
fn linking_an_executable_is_rejected(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("tool", ArtifactKind::Executable, ["llist.o"])?;
    b.add_artifact("libds.so", ArtifactKind::SharedLibrary, ["vector.o", "tool"])?;
    let err = b.finish().expect_err("executables are not link inputs");
    assert!(err.to_string().contains("executable `tool`"), "{err}");
    Ok(())
}

#[rstest]
fn mutually_linked_libraries_form_a_cycle(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("liba.so", ArtifactKind::SharedLibrary, ["llist.o", "libb.so"])?;
    b.add_artifact("libb.so", ArtifactKind::SharedLibrary, ["vector.o", "liba.so"])?;
    let err = b.finish().expect_err("cycle");
    let BuildError::CycleDetected { cycle } = err else {
        panic!("expected CycleDetected, got {err:?}");
    };
    assert_eq!(
        cycle,
        vec![
            ds_tree.path("bin/liba.so"),
            ds_tree.path("bin/libb.so"),
            ds_tree.path("bin/liba.so"),
        ]
    );
    Ok(())
}

#[rstest]
fn directory_at_artifact_path_conflicts(ds_tree: ProjectTree) -> Result<()> {
    std::fs::create_dir_all(ds_tree.path("bin/libds.a"))?;
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let err = b.finish().expect_err("directory in the way");
    assert!(matches!(err, BuildError::OutputPathConflict { .. }), "{err:?}");
    Ok(())
}

#[rstest]
fn file_in_place_of_the_library_dir_is_left_to_the_build(ds_tree: ProjectTree) -> Result<()> {
    ds_tree.write("bin", "")?;
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let graph = b.finish()?;
    assert!(graph.artifact("libds.a").is_some());
    Ok(())
}

#[cfg(unix)]
#[rstest]
fn symlinked_artifact_file_is_accepted(ds_tree: ProjectTree) -> Result<()> {
    let target = ds_tree.write("vendor/libds.a", "")?;
    std::fs::create_dir_all(ds_tree.path("bin"))?;
    std::os::unix::fs::symlink(&target, ds_tree.path("bin/libds.a"))?;
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let graph = b.finish()?;
    assert!(graph.artifact("libds.a").is_some());
    Ok(())
}

#[rstest]
fn locator_errors_abort_construction(ds_tree: ProjectTree) -> Result<()> {
    let mut b = builder(&ds_tree);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["queue.o"])?;
    let err = b.finish().expect_err("missing source");
    assert!(matches!(err, BuildError::SourceNotFound { .. }), "{err:?}");
    Ok(())
}

#[test]
fn mode_scoped_libraries_live_under_the_mode_directory() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/llist.c"])?;
    let config = globuild::ast::LayoutConfig {
        mode_scoped_artifacts: true,
        ..Default::default()
    };
    let layout = Layout::from_config(tree.root(), &config);
    let mut b = GraphBuilder::new(layout, BuildMode::Release);
    b.add_artifact("libds.a", ArtifactKind::StaticLibrary, ["llist.o"])?;
    let graph = b.finish()?;
    assert!(graph.lookup(&tree.path("bin/rls/libds.a")).is_some());
    Ok(())
}
