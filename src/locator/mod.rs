//! Source discovery by file-name search under the layout's source roots.
//!
//! A logical name such as `llist.o` is reduced to its stem and matched
//! against every file below each source root. Roots are tried in order and
//! the first root containing a match decides; a second match in that root is
//! an ambiguity, never a silent pick.

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::BuildError;
use crate::layout::Layout;

/// A source file found for a logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSource {
    /// Path of the source file.
    pub path: Utf8PathBuf,
    /// Search root the file was found under.
    pub root: Utf8PathBuf,
}

/// Resolves logical input names to source files.
pub trait SourceLookup {
    /// Find the single source file producing `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SourceNotFound`], [`BuildError::AmbiguousSource`],
    /// or [`BuildError::SourceSearchFailed`].
    fn locate(&self, name: &str) -> Result<LocatedSource, BuildError>;
}

/// Filesystem-backed [`SourceLookup`].
#[derive(Debug, Clone)]
pub struct SourceLocator {
    layout: Layout,
}

impl SourceLocator {
    /// Search the source roots of `layout`.
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self { layout }
    }

    const fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.layout.case_sensitive(),
            require_literal_separator: true,
            require_literal_leading_dot: false,
        }
    }

    /// File-name patterns accepted for `name`, with the stem they share.
    fn patterns_for(&self, name: &str) -> Result<(String, Vec<Pattern>), BuildError> {
        let path = Utf8Path::new(name);
        let stem = path.file_stem().unwrap_or(name).to_owned();
        let escaped = Pattern::escape(&stem);

        let extensions: Vec<&str> = match path.extension() {
            Some(ext) if self.layout.is_source_name(name) => vec![ext],
            _ => self
                .layout
                .source_extensions()
                .iter()
                .map(String::as_str)
                .collect(),
        };

        let patterns = extensions
            .into_iter()
            .map(|ext| Pattern::new(&format!("{escaped}.{}", Pattern::escape(ext))))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| BuildError::InvalidDeclaration {
                name: name.to_owned(),
                reason: err.to_string(),
            })?;
        Ok((stem, patterns))
    }

    fn search_root(
        &self,
        root: &Utf8Path,
        patterns: &[Pattern],
    ) -> Result<Vec<Utf8PathBuf>, BuildError> {
        let options = self.match_options();
        let excluded = self.layout.output_dirs();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !excluded.iter().any(|dir| entry.path() == dir.as_std_path()));

        let mut matches = Vec::new();
        for walk_entry in walker {
            let entry = walk_entry.map_err(|source| BuildError::SourceSearchFailed {
                root: root.to_path_buf(),
                source,
            })?;
            // Symlinked files count; directory links are never followed.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                debug!(path = ?entry.path(), "skipping non-UTF-8 file name");
                continue;
            };
            if !patterns
                .iter()
                .any(|pattern| pattern.matches_with(file_name, options))
            {
                continue;
            }
            match Utf8PathBuf::from_path_buf(entry.into_path()) {
                Ok(path) => matches.push(path),
                Err(path) => debug!(path = ?path, "skipping non-UTF-8 path"),
            }
        }
        matches.sort();
        Ok(matches)
    }
}

impl SourceLookup for SourceLocator {
    fn locate(&self, name: &str) -> Result<LocatedSource, BuildError> {
        let (stem, patterns) = self.patterns_for(name)?;

        for root in self.layout.source_dirs() {
            if !root.is_dir() {
                debug!(root = %root, "source root absent; skipping");
                continue;
            }
            let mut matches = self.search_root(root, &patterns)?;
            match matches.len() {
                0 => continue,
                1 => {
                    let path = matches.remove(0);
                    debug!(name, source = %path, "located source");
                    return Ok(LocatedSource {
                        path,
                        root: root.clone(),
                    });
                }
                _ => {
                    return Err(BuildError::AmbiguousSource {
                        stem,
                        candidates: matches,
                    });
                }
            }
        }

        Err(BuildError::SourceNotFound {
            stem,
            roots: self.layout.source_dirs().to_vec(),
        })
    }
}
