//! Source discovery across the layout's search roots.

use anyhow::Result;
use globuild::BuildError;
use globuild::ast::LayoutConfig;
use globuild::locator::{SourceLocator, SourceLookup};
use globuild::Layout;
use rstest::rstest;
use test_support::ProjectTree;

#[test]
fn finds_sources_in_nested_directories() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/llist/llist.c", "src/vector/vector.c"])?;
    let located = SourceLocator::new(tree.layout()).locate("vector.o")?;
    assert_eq!(located.path, tree.path("src/vector/vector.c"));
    assert_eq!(located.root, tree.path("src"));
    Ok(())
}

#[test]
fn duplicate_stems_are_ambiguous() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/a/util.c", "src/b/util.c"])?;
    let err = SourceLocator::new(tree.layout())
        .locate("util.o")
        .expect_err("two candidates");
    match err {
        BuildError::AmbiguousSource { stem, candidates } => {
            assert_eq!(stem, "util");
            assert_eq!(
                candidates,
                vec![tree.path("src/a/util.c"), tree.path("src/b/util.c")]
            );
        }
        other => panic!("expected AmbiguousSource, got {other:?}"),
    }
    Ok(())
}

#[test]
fn first_root_with_a_match_wins() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/util.c", "test/util.c"])?;
    let located = SourceLocator::new(tree.layout()).locate("util.o")?;
    assert_eq!(located.path, tree.path("src/util.c"));
    Ok(())
}

#[test]
fn missing_source_names_stem_and_roots() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/llist.c"])?;
    let err = SourceLocator::new(tree.layout())
        .locate("queue.o")
        .expect_err("no queue source");
    let message = err.to_string();
    assert!(message.contains("`queue`"), "{message}");
    assert!(message.contains(tree.path("src").as_str()), "{message}");
    assert!(message.contains(tree.path("test").as_str()), "{message}");
    Ok(())
}

#[rstest]
#[case::exact_extension("util.c", "src/util.c")]
#[case::other_extension("util.o", "src/util.c")]
fn extension_on_request_restricts_matches(
    #[case] name: &str,
    #[case] expected: &str,
) -> Result<()> {
    let tree = ProjectTree::with_files(&["src/util.c", "src/extra/util.h"])?;
    let located = SourceLocator::new(tree.layout()).locate(name)?;
    assert_eq!(located.path, tree.path(expected));
    Ok(())
}

#[test]
fn case_insensitive_matching_is_opt_in() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/LList.C"])?;
    let config = LayoutConfig {
        case_sensitive: false,
        ..LayoutConfig::default()
    };
    let layout = Layout::from_config(tree.root(), &config);
    let located = SourceLocator::new(layout).locate("llist.o")?;
    assert_eq!(located.path, tree.path("src/LList.C"));
    Ok(())
}

#[test]
fn custom_extensions_are_recognised() -> Result<()> {
    let tree = ProjectTree::with_files(&["src/shapes.cpp"])?;
    let config = LayoutConfig {
        source_extensions: vec!["c".into(), "cpp".into()],
        ..LayoutConfig::default()
    };
    let located = SourceLocator::new(Layout::from_config(tree.root(), &config)).locate("shapes.o")?;
    assert_eq!(located.path, tree.path("src/shapes.cpp"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_sources_are_found() -> Result<()> {
    let tree = ProjectTree::with_files(&["vendor/llist.c"])?;
    std::fs::create_dir_all(tree.path("src"))?;
    std::os::unix::fs::symlink(tree.path("vendor/llist.c"), tree.path("src/llist.c"))?;
    let located = SourceLocator::new(tree.layout()).locate("llist.o")?;
    assert_eq!(located.path, tree.path("src/llist.c"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn directory_links_are_not_followed() -> Result<()> {
    let tree = ProjectTree::with_files(&["vendor/llist.c", "src/main.c"])?;
    std::os::unix::fs::symlink(tree.path("vendor"), tree.path("src/vendor"))?;
    let err = SourceLocator::new(tree.layout())
        .locate("llist.o")
        .expect_err("linked directory is not searched");
    assert!(matches!(err, BuildError::SourceNotFound { .. }), "{err:?}");
    Ok(())
}
