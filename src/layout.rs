//! Project layout: where sources live and where derived outputs go.

use camino::{Utf8Path, Utf8PathBuf};

use crate::ast::LayoutConfig;
use crate::graph::ArtifactKind;
use crate::mode::BuildMode;

/// Root-joined directory conventions for one project.
///
/// ```
/// use globuild::{BuildMode, Layout};
/// let layout = Layout::new("/work");
/// assert_eq!(layout.object_root(BuildMode::Debug), "/work/obj/dbg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: Utf8PathBuf,
    source_dirs: Vec<Utf8PathBuf>,
    object_dir: Utf8PathBuf,
    library_dir: Utf8PathBuf,
    executable_dir: Utf8PathBuf,
    source_extensions: Vec<String>,
    object_extension: String,
    case_sensitive: bool,
    mode_scoped_artifacts: bool,
}

impl Layout {
    /// Default conventions rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self::from_config(root, &LayoutConfig::default())
    }

    /// Conventions from a manifest `layout` section rooted at `root`.
    #[must_use]
    pub fn from_config(root: impl Into<Utf8PathBuf>, config: &LayoutConfig) -> Self {
        let root_dir = root.into();
        Self {
            source_dirs: config
                .source_dirs
                .iter()
                .map(|dir| root_dir.join(dir))
                .collect(),
            object_dir: root_dir.join(&config.object_dir),
            library_dir: root_dir.join(&config.library_dir),
            executable_dir: root_dir.join(&config.executable_dir),
            source_extensions: config
                .source_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_owned())
                .collect(),
            object_extension: config.object_extension.trim_start_matches('.').to_owned(),
            case_sensitive: config.case_sensitive,
            mode_scoped_artifacts: config.mode_scoped_artifacts,
            root: root_dir,
        }
    }

    /// Project root every other directory is joined onto.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Source search roots in priority order.
    #[must_use]
    pub fn source_dirs(&self) -> &[Utf8PathBuf] {
        &self.source_dirs
    }

    /// Recognised source extensions, without dots.
    #[must_use]
    pub fn source_extensions(&self) -> &[String] {
        &self.source_extensions
    }

    /// Whether file name matching distinguishes case.
    #[must_use]
    pub const fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Directory receiving compiled units for `mode`.
    #[must_use]
    pub fn object_root(&self, mode: BuildMode) -> Utf8PathBuf {
        self.object_dir.join(mode.dir_name())
    }

    /// Object path for a source found under `search_root`.
    ///
    /// The source's directory structure below its search root is mirrored
    /// under the object root.
    #[must_use]
    pub fn object_path(
        &self,
        source: &Utf8Path,
        search_root: &Utf8Path,
        mode: BuildMode,
    ) -> Utf8PathBuf {
        let relative = source
            .strip_prefix(search_root)
            .ok()
            .or_else(|| source.file_name().map(Utf8Path::new))
            .unwrap_or(source);
        self.object_root(mode)
            .join(relative)
            .with_extension(&self.object_extension)
    }

    /// Output path for a declared artifact.
    #[must_use]
    pub fn artifact_path(&self, kind: ArtifactKind, name: &str, mode: BuildMode) -> Utf8PathBuf {
        match kind {
            ArtifactKind::Executable => self.executable_dir.join(name),
            ArtifactKind::StaticLibrary | ArtifactKind::SharedLibrary
                if self.mode_scoped_artifacts =>
            {
                self.library_dir.join(mode.dir_name()).join(name)
            }
            ArtifactKind::StaticLibrary | ArtifactKind::SharedLibrary => {
                self.library_dir.join(name)
            }
        }
    }

    /// Output directories the source search must never descend into.
    #[must_use]
    pub fn output_dirs(&self) -> [&Utf8Path; 3] {
        [&self.object_dir, &self.library_dir, &self.executable_dir]
    }

    /// True when `name` carries a recognised source extension.
    #[must_use]
    pub fn is_source_name(&self, name: &str) -> bool {
        Utf8Path::new(name).extension().is_some_and(|ext| {
            self.source_extensions.iter().any(|known| {
                if self.case_sensitive {
                    known == ext
                } else {
                    known.eq_ignore_ascii_case(ext)
                }
            })
        })
    }
}
