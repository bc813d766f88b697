//! Path resolution helpers for the runner module.
//!
//! The project root is canonicalised through a capability handle on its
//! parent directory; every other path is joined onto it.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use std::env;
use std::io::{self, ErrorKind};
use std::path::Path;

use super::RunnerError;
use crate::cli::Cli;

fn utf8(path: &Path) -> Result<&Utf8Path, RunnerError> {
    Utf8Path::from_path(path).ok_or_else(|| RunnerError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn current_dir() -> io::Result<Utf8PathBuf> {
    let cwd = env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("current directory {} is not valid UTF-8", path.display()),
        )
    })
}

/// Canonical absolute form of the directory at `path`.
pub(super) fn canonicalize_dir(path: &Utf8Path) -> io::Result<Utf8PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir()?.join(path)
    };
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => {
            let handle = Dir::open_ambient_dir(parent, ambient_authority())?;
            let canonical = handle.canonicalize(name)?;
            parent.join(canonical)
        }
        _ => absolute,
    };
    if resolved.is_dir() {
        Ok(resolved)
    } else {
        Err(io::Error::new(ErrorKind::NotADirectory, "not a directory"))
    }
}

/// Project root: `-C/--directory` when given, else the working directory.
pub(super) fn resolve_project_root(cli: &Cli) -> Result<Utf8PathBuf, RunnerError> {
    let requested = match &cli.directory {
        Some(dir) => utf8(dir)?.to_path_buf(),
        None => Utf8PathBuf::from("."),
    };
    canonicalize_dir(&requested).map_err(|source| RunnerError::ProjectDirectory {
        path: requested,
        source,
    })
}

/// Manifest location, relative to the project root unless absolute.
pub(super) fn resolve_manifest_path(
    cli: &Cli,
    root: &Utf8Path,
) -> Result<Utf8PathBuf, RunnerError> {
    let path = root.join(utf8(&cli.file)?);
    if path.is_file() {
        Ok(path)
    } else {
        Err(RunnerError::ManifestNotFound { path })
    }
}
