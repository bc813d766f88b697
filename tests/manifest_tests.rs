//! Manifest parsing and validation.

use anyhow::Result;
use camino::Utf8PathBuf;
use globuild::ast::{LayoutConfig, ToolchainConfig};
use globuild::graph::ArtifactKind;
use globuild::manifest::{self, ManifestError, ManifestName};
use miette::Diagnostic;
use rstest::rstest;
use test_support::{ProjectTree, display_error_chain};

const LIBDS: &str = r#"
globuild_version: "1.0.0"
layout:
  source_dirs: [src, tests]
  object_dir: build/obj
  mode_scoped_artifacts: true
toolchain:
  cc: clang
  cflags: ["-std=c11", "-Wall"]
artifacts:
  - name: libds.a
    kind: static_library
    inputs: [llist.o, vector.o]
  - name: test_llist
    kind: executable
    units: [test_llist.c, libds.a]
"#;

#[test]
fn parses_a_full_manifest() -> Result<()> {
    let parsed = manifest::from_str(LIBDS)?;
    assert_eq!(parsed.globuild_version.to_string(), "1.0.0");
    assert_eq!(
        parsed.layout.source_dirs,
        [Utf8PathBuf::from("src"), Utf8PathBuf::from("tests")]
    );
    assert_eq!(parsed.layout.object_dir, "build/obj");
    assert_eq!(parsed.layout.library_dir, "bin");
    assert!(parsed.layout.mode_scoped_artifacts);
    assert_eq!(parsed.toolchain.cc.as_deref(), Some("clang"));
    assert_eq!(parsed.toolchain.ar, None);

    let kinds: Vec<_> = parsed.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [ArtifactKind::StaticLibrary, ArtifactKind::Executable]);
    let test_llist = parsed.artifacts.get(1).expect("second artifact");
    assert_eq!(test_llist.inputs, ["test_llist.c", "libds.a"]);
    Ok(())
}

#[test]
fn omitted_sections_take_defaults() -> Result<()> {
    let parsed = manifest::from_str(
        "globuild_version: \"1.2.0\"\nartifacts:\n  - name: libds.so\n    kind: shared_library\n    inputs: [llist.o]\n",
    )?;
    assert_eq!(parsed.layout, LayoutConfig::default());
    assert_eq!(parsed.toolchain, ToolchainConfig::default());
    let kinds: Vec<_> = parsed.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [ArtifactKind::SharedLibrary]);
    Ok(())
}

#[rstest]
#[case::unknown_top_level(
    "globuild_version: \"1.0.0\"\nartifacts: []\nrules: []\n",
    "unknown field"
)]
#[case::unknown_kind(
    "globuild_version: \"1.0.0\"\nartifacts:\n  - name: x\n    kind: dylib\n    inputs: [a.o]\n",
    "unknown variant"
)]
#[case::missing_inputs(
    "globuild_version: \"1.0.0\"\nartifacts:\n  - name: x\n    kind: executable\n",
    "missing field"
)]
fn schema_violations_are_parse_errors(#[case] yaml: &str, #[case] detail: &str) {
    let err = manifest::from_str_named(yaml, &ManifestName::new("Globuildfile"))
        .expect_err("invalid manifest");
    assert!(matches!(err, ManifestError::Parse { .. }), "{err:?}");
    let chain = display_error_chain(&err);
    assert!(chain.starts_with("failed to parse manifest Globuildfile"), "{chain}");
    assert!(chain.contains(detail), "{chain}");
}

#[test]
fn parse_errors_carry_a_yaml_diagnostic() {
    let err = manifest::from_str("globuild_version: \"1.0.0\"\nartifacts: [\n")
        .expect_err("unterminated sequence");
    let code = err.diagnostic_source().and_then(|inner| inner.code()).map(|c| c.to_string());
    assert_eq!(code.as_deref(), Some("globuild::manifest::yaml"));
}

#[test]
fn other_major_versions_are_refused() {
    let err = manifest::from_str("globuild_version: \"2.0.0\"\nartifacts: []\n")
        .expect_err("version 2");
    assert!(
        matches!(
            err,
            ManifestError::UnsupportedVersion { ref version, supported: 1 } if version.major == 2
        ),
        "{err:?}"
    );
    assert_eq!(err.to_string(), "unsupported globuild_version 2.0.0; expected 1.x");
}

#[test]
fn loads_from_disk() -> Result<()> {
    let tree = ProjectTree::new()?;
    let path = tree.write("Globuildfile", LIBDS)?;
    let parsed = manifest::from_path(&path)?;
    assert_eq!(parsed.artifacts.len(), 2);

    let err = manifest::from_path(tree.path("missing.yml")).expect_err("absent");
    assert!(err.to_string().starts_with("failed to read manifest"), "{err}");
    Ok(())
}
