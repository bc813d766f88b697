//! Output directory preparation.

use std::fs;
use std::io::{self, ErrorKind};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::error::BuildError;

/// Make sure the directory holding `output` exists.
///
/// Returns the directory when this call created it.
pub(super) fn ensure_parent_dir(output: &Utf8Path) -> Result<Option<Utf8PathBuf>, BuildError> {
    let Some(directory) = output.parent().filter(|dir| !dir.as_str().is_empty()) else {
        return Ok(None);
    };
    let failed = |source: io::Error| BuildError::DirectoryCreationFailed {
        directory: directory.to_path_buf(),
        path: output.to_path_buf(),
        source,
    };

    match fs::metadata(directory) {
        Ok(meta) if meta.is_dir() => return Ok(None),
        Ok(_) => {
            return Err(failed(io::Error::new(
                ErrorKind::AlreadyExists,
                "a non-directory entry occupies this path",
            )));
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(failed(err)),
    }

    fs::create_dir_all(directory).map_err(failed)?;
    info!(directory = %directory, "created directory");
    Ok(Some(directory.to_path_buf()))
}
