//! Throwaway project trees with controllable timestamps.

use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use globuild::Layout;
use tempfile::TempDir;

/// A temporary project directory. Removed on drop.
#[derive(Debug)]
pub struct ProjectTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl ProjectTree {
    /// Create an empty project.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create project dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow!("temp dir {} is not UTF-8", p.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Create a project containing empty files at `files`.
    pub fn with_files(files: &[&str]) -> Result<Self> {
        let tree = Self::new()?;
        for file in files {
            tree.write(file, "")?;
        }
        Ok(tree)
    }

    /// Project root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative`.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Default layout rooted at this project.
    pub fn layout(&self) -> Layout {
        Layout::new(self.root.clone())
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Set the modification time of `relative`.
    pub fn set_mtime(&self, relative: &str, time: SystemTime) -> Result<()> {
        set_file_mtime(&self.path(relative), time)
    }

    /// Set `relative`'s modification time to `age` before now.
    pub fn age(&self, relative: &str, age: Duration) -> Result<()> {
        self.set_mtime(relative, ago(age)?)
    }

    /// Age every file in the project by `age` relative to now.
    pub fn age_all(&self, age: Duration) -> Result<()> {
        let time = ago(age)?;
        age_dir(&self.root, time)
    }
}

fn ago(age: Duration) -> Result<SystemTime> {
    SystemTime::now()
        .checked_sub(age)
        .ok_or_else(|| anyhow!("cannot go back {age:?}"))
}

fn set_file_mtime(path: &Utf8Path, time: SystemTime) -> Result<()> {
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .with_context(|| format!("set mtime of {path}"))
}

fn age_dir(dir: &Utf8Path, time: SystemTime) -> Result<()> {
    for entry in dir.read_dir_utf8().with_context(|| format!("read {dir}"))? {
        let entry = entry.with_context(|| format!("read entry in {dir}"))?;
        let file_type = entry.file_type().context("file type")?;
        if file_type.is_dir() {
            age_dir(entry.path(), time)?;
        } else if file_type.is_file() {
            set_file_mtime(entry.path(), time)?;
        }
    }
    Ok(())
}
