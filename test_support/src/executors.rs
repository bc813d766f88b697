//! In-process [`ActionExecutor`] doubles.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use globuild::BuildMode;
use globuild::executor::{ActionExecutor, ActionKind, ActionRequest, ExecutionError};

/// One request seen by a [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAction {
    /// Requested action.
    pub kind: ActionKind,
    /// Output path.
    pub output: Utf8PathBuf,
    /// Inputs, in the order they were passed.
    pub inputs: Vec<Utf8PathBuf>,
    /// Build mode.
    pub mode: BuildMode,
}

/// Records every request and, unless told otherwise, writes the output file
/// so the next staleness check sees a fresh timestamp.
#[derive(Debug)]
pub struct RecordingExecutor {
    actions: Vec<RecordedAction>,
    write_outputs: bool,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingExecutor {
    /// Executor that produces every requested output.
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
            write_outputs: true,
        }
    }

    /// Executor that reports success without producing anything.
    pub const fn without_outputs() -> Self {
        Self {
            actions: Vec::new(),
            write_outputs: false,
        }
    }

    /// Requests seen so far.
    pub fn actions(&self) -> &[RecordedAction] {
        &self.actions
    }

    /// Outputs relative to `root`, as strings, for compact assertions.
    pub fn relative_outputs(&self, root: &Utf8Path) -> Vec<String> {
        self.actions
            .iter()
            .map(|a| {
                a.output
                    .strip_prefix(root)
                    .unwrap_or(&a.output)
                    .to_string()
            })
            .collect()
    }

    /// Forget recorded requests.
    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, request: &ActionRequest<'_>) -> Result<(), ExecutionError> {
        self.actions.push(RecordedAction {
            kind: request.kind,
            output: request.output.to_path_buf(),
            inputs: request.inputs.iter().map(|p| p.to_path_buf()).collect(),
            mode: request.mode,
        });
        if self.write_outputs {
            fs::write(request.output, format!("{:?}\n", request.kind)).map_err(|err| {
                ExecutionError::Rejected {
                    message: format!("cannot write {}: {err}", request.output),
                }
            })?;
        }
        Ok(())
    }
}

/// Fails on any output whose path ends with `fail_on`; otherwise behaves like
/// a [`RecordingExecutor`].
#[derive(Debug)]
pub struct FailingExecutor {
    fail_on: Utf8PathBuf,
    inner: RecordingExecutor,
}

impl FailingExecutor {
    /// Fail when asked to produce `fail_on`.
    pub fn new(fail_on: impl Into<Utf8PathBuf>) -> Self {
        Self {
            fail_on: fail_on.into(),
            inner: RecordingExecutor::new(),
        }
    }

    /// Requests seen so far, including the failing one.
    pub fn actions(&self) -> &[RecordedAction] {
        self.inner.actions()
    }
}

impl ActionExecutor for FailingExecutor {
    fn execute(&mut self, request: &ActionRequest<'_>) -> Result<(), ExecutionError> {
        if request.output.ends_with(&self.fail_on) {
            self.inner.actions.push(RecordedAction {
                kind: request.kind,
                output: request.output.to_path_buf(),
                inputs: request.inputs.iter().map(|p| p.to_path_buf()).collect(),
                mode: request.mode,
            });
            return Err(ExecutionError::Rejected {
                message: format!("error: cannot build {}", self.fail_on),
            });
        }
        self.inner.execute(request)
    }
}
