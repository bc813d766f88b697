//! Fake compiler and archiver scripts for end-to-end runs.
//!
//! Each script appends its arguments to a shared log and touches the file it
//! was asked to produce, so timestamps behave as with a real toolchain.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use toolchain_env::{AR_ENV, CC_ENV};

const FAKE_CC: &str = r#"echo "cc $*" >> "$LOG"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
if [ -n "$out" ]; then
  : > "$out"
fi
"#;

const FAKE_AR: &str = r#"echo "ar $*" >> "$LOG"
: > "$2"
"#;

/// Scripts standing in for `cc` and `ar`.
#[derive(Debug)]
pub struct FakeToolchain {
    _dir: TempDir,
    cc: PathBuf,
    ar: PathBuf,
    log: PathBuf,
}

impl FakeToolchain {
    /// Scripts that succeed and produce their outputs.
    pub fn new() -> Result<Self> {
        Self::with_cc_body(FAKE_CC)
    }

    /// A compiler that prints `diagnostic` to stderr and exits with status 1.
    pub fn failing(diagnostic: &str) -> Result<Self> {
        Self::with_cc_body(&format!(
            "echo \"cc $*\" >> \"$LOG\"\necho '{diagnostic}' >&2\nexit 1\n"
        ))
    }

    fn with_cc_body(cc_body: &str) -> Result<Self> {
        let dir = TempDir::new().context("fake toolchain: create temp dir")?;
        let log = dir.path().join("commands.log");
        let cc = write_script(dir.path(), "cc", &log, cc_body)?;
        let ar = write_script(dir.path(), "ar", &log, FAKE_AR)?;
        Ok(Self {
            _dir: dir,
            cc,
            ar,
            log,
        })
    }

    /// Environment pointing globuild at the scripts.
    pub fn envs(&self) -> [(&'static str, &Path); 2] {
        [(CC_ENV, self.cc.as_path()), (AR_ENV, self.ar.as_path())]
    }

    /// Logged invocations, one line per command, with `root/` stripped.
    pub fn commands(&self, root: &Path) -> Result<Vec<String>> {
        let prefix = format!("{}/", root.display());
        match fs::read_to_string(&self.log) {
            Ok(text) => Ok(text.lines().map(|line| line.replace(&prefix, "")).collect()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err).context("read command log"),
        }
    }
}

fn write_script(dir: &Path, name: &str, log: &Path, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    write!(file, "#!/bin/sh\nLOG='{}'\n{body}", log.display())
        .with_context(|| format!("write {}", path.display()))?;
    make_executable(&path)?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .with_context(|| format!("read metadata {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
