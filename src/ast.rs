//! Globuild manifest Abstract Syntax Tree structures.
//!
//! These types mirror the YAML schema of a `Globuildfile` and are
//! deserialised with `serde_saphyr`. Optional sections default so a manifest
//! may list nothing but its artifacts.
//!
//! ```rust
//! use globuild::ast::GlobuildManifest;
//!
//! let yaml = "globuild_version: \"1.0.0\"\nartifacts:\n  - name: libds.a\n    kind: static_library\n    inputs: [llist.o]";
//! let manifest: GlobuildManifest = serde_saphyr::from_str(yaml).expect("parse");
//! assert_eq!(manifest.artifacts[0].inputs, ["llist.o"]);
//! ```

use camino::Utf8PathBuf;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::graph::ArtifactKind;

/// Top-level manifest structure parsed from a `Globuildfile`.
///
/// ```yaml
/// globuild_version: "1.0.0"
/// artifacts:
///   - name: libds.a
///     kind: static_library
///     inputs: [llist.o, vector.o]
/// ```
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GlobuildManifest {
    /// Semantic version of the manifest format.
    pub globuild_version: Version,

    /// Directory conventions for sources and derived outputs.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Programs and flags used to produce outputs.
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Declared artifacts, in build order.
    pub artifacts: Vec<ArtifactSpec>,
}

/// Filesystem conventions, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Search roots for sources, in priority order.
    pub source_dirs: Vec<Utf8PathBuf>,
    /// Root for compiled units; the build mode is appended beneath it.
    pub object_dir: Utf8PathBuf,
    /// Directory receiving static and shared libraries.
    pub library_dir: Utf8PathBuf,
    /// Directory receiving executables.
    pub executable_dir: Utf8PathBuf,
    /// Extensions recognised as source files, without the leading dot.
    pub source_extensions: Vec<String>,
    /// Extension given to compiled units.
    pub object_extension: String,
    /// Whether file name matching distinguishes case.
    pub case_sensitive: bool,
    /// Place libraries under a per-mode subdirectory of `library_dir`.
    pub mode_scoped_artifacts: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec![Utf8PathBuf::from("src"), Utf8PathBuf::from("test")],
            object_dir: Utf8PathBuf::from("obj"),
            library_dir: Utf8PathBuf::from("bin"),
            executable_dir: Utf8PathBuf::from("test/bin"),
            source_extensions: vec!["c".to_owned()],
            object_extension: "o".to_owned(),
            case_sensitive: true,
            mode_scoped_artifacts: false,
        }
    }
}

/// Toolchain overrides. Unset fields fall back to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// C compiler driver.
    pub cc: Option<String>,
    /// Static archiver.
    pub ar: Option<String>,
    /// Flags added to every compiler invocation.
    pub cflags: Option<Vec<String>>,
    /// Flags appended to link invocations.
    pub ldflags: Option<Vec<String>>,
}

/// A single declared artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSpec {
    /// Output file name, relative to the directory chosen by `kind`.
    pub name: String,
    /// What the artifact is.
    pub kind: ArtifactKind,
    /// Compiled-unit names, source names, or other artifact names.
    #[serde(alias = "units")]
    pub inputs: Vec<String>,
}
