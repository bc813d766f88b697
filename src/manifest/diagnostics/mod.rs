//! Translates manifest parsing failures into actionable diagnostics.
//!
//! [`ManifestSource`] retains the YAML text and [`ManifestName`] labels its
//! origin so [`map_yaml_error`] can point at the offending span.
//
// Module-level suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others, so `#[expect]` cannot be used here.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::fmt;
use semver::Version;
use thiserror::Error;

mod yaml;

pub use yaml::map_yaml_error;

/// YAML source content for a manifest.
///
/// ```rust
/// use globuild::manifest::ManifestSource;
/// let source = ManifestSource::from("artifacts: []");
/// assert_eq!(source.as_str(), "artifacts: []");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestSource(String);

impl ManifestSource {
    /// Wrap manifest text.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    /// View the stored text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ManifestSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ManifestSource {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label for a manifest in diagnostics, usually its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestName(String);

impl ManifestName {
    /// Wrap a label.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// View the label.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ManifestName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for ManifestName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ManifestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error raised when a manifest cannot be used.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The manifest is not valid YAML or does not match the schema.
    #[error("{message}")]
    #[diagnostic(code(globuild::manifest::parse))]
    Parse {
        /// Diagnostic pointing into the manifest source.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
        /// Summary naming the manifest.
        message: String,
    },

    /// The manifest targets a format this build does not understand.
    #[error("unsupported globuild_version {version}; expected {supported}.x")]
    #[diagnostic(
        code(globuild::manifest::version),
        help("update the manifest or use a matching globuild release")
    )]
    UnsupportedVersion {
        /// Version declared by the manifest.
        version: Version,
        /// Supported major version.
        supported: u64,
    },
}
