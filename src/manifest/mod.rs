//! Manifest loading.
//!
//! A `Globuildfile` is parsed straight into [`GlobuildManifest`] with
//! `serde_saphyr`. Syntax and schema errors become [`ManifestError::Parse`]
//! diagnostics pointing into the source; a manifest written for another major
//! format version is refused.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;

use crate::ast::GlobuildManifest;

mod diagnostics;
mod hints;

pub use diagnostics::{ManifestError, ManifestName, ManifestSource, map_yaml_error};

/// Major `globuild_version` understood by this build.
pub const SUPPORTED_MAJOR: u64 = 1;

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "Globuildfile";

/// Parse manifest text labelled `name` in diagnostics.
///
/// # Errors
///
/// Returns [`ManifestError::Parse`] for malformed YAML or schema violations
/// and [`ManifestError::UnsupportedVersion`] for another major version.
pub fn from_str_named(yaml: &str, name: &ManifestName) -> Result<GlobuildManifest, ManifestError> {
    let manifest: GlobuildManifest =
        serde_saphyr::from_str(yaml).map_err(|err| ManifestError::Parse {
            source: map_yaml_error(err, &ManifestSource::from(yaml), name),
            message: format!("failed to parse manifest {name}", name = name.as_str()),
        })?;

    if manifest.globuild_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            version: manifest.globuild_version,
            supported: SUPPORTED_MAJOR,
        });
    }
    Ok(manifest)
}

/// Parse manifest text.
///
/// # Errors
///
/// See [`from_str_named`].
///
/// ```rust
/// let yaml = "globuild_version: \"1.0.0\"\nartifacts: []";
/// let manifest = globuild::manifest::from_str(yaml).expect("parse");
/// assert!(manifest.artifacts.is_empty());
/// ```
pub fn from_str(yaml: &str) -> Result<GlobuildManifest, ManifestError> {
    from_str_named(yaml, &ManifestName::new(DEFAULT_MANIFEST))
}

/// Load a manifest from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<GlobuildManifest> {
    let path_ref = path.as_ref();
    let data = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read manifest {path_ref}"))?;
    Ok(from_str_named(&data, &ManifestName::new(path_ref.as_str()))?)
}
