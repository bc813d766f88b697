//! Blocking subprocess execution for toolchain commands.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::info;

use super::{CommandLine, ExecutionError};

/// Run `line` to completion, without a shell.
///
/// Output from successful runs (warnings, mostly) is forwarded to stderr.
/// Failed runs keep their output as the error diagnostic.
pub(super) fn run(line: &CommandLine) -> Result<(), ExecutionError> {
    info!("Running command: {line}");
    let output = Command::new(line.program())
        .args(line.args())
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ExecutionError::Spawn {
            program: line.program().to_owned(),
            source,
        })?;

    if output.status.success() {
        let mut stderr = io::stderr().lock();
        drop(stderr.write_all(&output.stdout));
        drop(stderr.write_all(&output.stderr));
        return Ok(());
    }

    let captured = if output.stderr.is_empty() {
        output.stdout
    } else {
        output.stderr
    };
    Err(ExecutionError::Failed {
        command: line.to_string(),
        status: output.status,
        diagnostic: String::from_utf8_lossy(&captured).trim_end().to_owned(),
    })
}
