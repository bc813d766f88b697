//! Compiler and archiver invocation.

use std::env;
use std::ffi::OsString;
use std::fmt;

use itertools::Itertools;
use toolchain_env::{AR_ENV, CC_ENV};

use super::{ActionExecutor, ActionKind, ActionRequest, ExecutionError, process};
use crate::ast::ToolchainConfig;

const DEFAULT_CC: &str = "gcc";
const DEFAULT_AR: &str = "ar";
const DEFAULT_CFLAGS: &[&str] = &["-Wall"];

/// Programs and flags used to produce outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// C compiler driver, also used for linking.
    pub cc: String,
    /// Static archiver.
    pub ar: String,
    /// Flags added to every compile and link.
    pub cflags: Vec<String>,
    /// Flags appended to link commands.
    pub ldflags: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cc: DEFAULT_CC.to_owned(),
            ar: DEFAULT_AR.to_owned(),
            cflags: DEFAULT_CFLAGS.iter().map(|flag| (*flag).to_owned()).collect(),
            ldflags: Vec::new(),
        }
    }
}

impl Toolchain {
    /// Built-in defaults overridden by a manifest `toolchain` section.
    #[must_use]
    pub fn from_config(config: &ToolchainConfig) -> Self {
        let defaults = Self::default();
        Self {
            cc: config.cc.clone().unwrap_or(defaults.cc),
            ar: config.ar.clone().unwrap_or(defaults.ar),
            cflags: config.cflags.clone().unwrap_or(defaults.cflags),
            ldflags: config.ldflags.clone().unwrap_or(defaults.ldflags),
        }
    }

    /// Apply `GLOBUILD_CC` and `GLOBUILD_AR` from the process environment.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|key| env::var_os(key))
    }

    /// Apply program overrides looked up through `read_env`.
    ///
    /// Empty or non-UTF-8 values are ignored.
    ///
    /// ```
    /// use globuild::executor::Toolchain;
    /// let toolchain = Toolchain::default()
    ///     .with_env_overrides(|key| (key == "GLOBUILD_CC").then(|| "clang".into()));
    /// assert_eq!(toolchain.cc, "clang");
    /// assert_eq!(toolchain.ar, "ar");
    /// ```
    #[must_use]
    pub fn with_env_overrides<F>(mut self, mut read_env: F) -> Self
    where
        F: FnMut(&str) -> Option<OsString>,
    {
        let mut lookup = |key: &str| {
            read_env(key)
                .and_then(|value| value.into_string().ok())
                .filter(|value| !value.is_empty())
        };
        if let Some(cc) = lookup(CC_ENV) {
            self.cc = cc;
        }
        if let Some(ar) = lookup(AR_ENV) {
            self.ar = ar;
        }
        self
    }

    /// Command producing `request.output`.
    #[must_use]
    pub fn command_line(&self, request: &ActionRequest<'_>) -> CommandLine {
        let output = request.output.to_string();
        let inputs = request.inputs.iter().map(ToString::to_string);
        let mode_flags = request.mode.compile_flags().iter().map(|flag| (*flag).to_owned());

        match request.kind {
            ActionKind::Compile => CommandLine::new(&self.cc)
                .extend(mode_flags)
                .extend(self.cflags.iter().cloned())
                .extend(["-o".to_owned(), output, "-c".to_owned()])
                .extend(inputs),
            ActionKind::Archive => CommandLine::new(&self.ar)
                .extend(["rcs".to_owned(), output])
                .extend(inputs),
            ActionKind::LinkShared => CommandLine::new(&self.cc)
                .extend(["-shared".to_owned()])
                .extend(self.cflags.iter().cloned())
                .extend(["-o".to_owned(), output])
                .extend(inputs)
                .extend(self.ldflags.iter().cloned()),
            ActionKind::LinkExecutable => CommandLine::new(&self.cc)
                .extend(mode_flags)
                .extend(self.cflags.iter().cloned())
                .extend(["-o".to_owned(), output])
                .extend(inputs)
                .extend(self.ldflags.iter().cloned()),
        }
    }
}

/// A program and its arguments, rendered shell-quoted for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_owned(),
            args: Vec::new(),
        }
    }

    fn extend(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    /// Program to run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, excluding the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = || {
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
        };
        match shlex::try_join(words()) {
            Ok(joined) => f.write_str(&joined),
            Err(_) => f.write_str(&words().join(" ")),
        }
    }
}

/// Runs [`Toolchain`] commands as subprocesses.
#[derive(Debug, Clone, Default)]
pub struct ToolchainExecutor {
    toolchain: Toolchain,
}

impl ToolchainExecutor {
    /// Execute commands from `toolchain`.
    #[must_use]
    pub const fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

impl ActionExecutor for ToolchainExecutor {
    fn execute(&mut self, request: &ActionRequest<'_>) -> Result<(), ExecutionError> {
        process::run(&self.toolchain.command_line(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::BuildMode;
    use camino::Utf8Path;
    use rstest::rstest;

    fn render(kind: ActionKind, mode: BuildMode, inputs: &[&Utf8Path]) -> String {
        let request = ActionRequest {
            kind,
            output: Utf8Path::new("out/target"),
            inputs,
            mode,
        };
        Toolchain::default().command_line(&request).to_string()
    }

    #[rstest]
    #[case(ActionKind::Compile, BuildMode::Debug, "gcc -g -Wall -o out/target -c a.c")]
    #[case(
        ActionKind::Compile,
        BuildMode::Release,
        "gcc -O2 -DNDEBUG -Wall -o out/target -c a.c"
    )]
    #[case(ActionKind::Archive, BuildMode::Debug, "ar rcs out/target a.c")]
    #[case(ActionKind::LinkShared, BuildMode::Debug, "gcc -shared -Wall -o out/target a.c")]
    #[case(ActionKind::LinkExecutable, BuildMode::Debug, "gcc -g -Wall -o out/target a.c")]
    fn renders_command_shapes(
        #[case] kind: ActionKind,
        #[case] mode: BuildMode,
        #[case] expected: &str,
    ) {
        assert_eq!(render(kind, mode, &[Utf8Path::new("a.c")]), expected);
    }

    #[test]
    fn quotes_arguments_with_spaces() {
        let rendered = render(
            ActionKind::Archive,
            BuildMode::Debug,
            &[Utf8Path::new("my unit.o")],
        );
        assert_eq!(rendered, "ar rcs out/target 'my unit.o'");
    }

    #[test]
    fn manifest_settings_replace_defaults() {
        let config = ToolchainConfig {
            cc: Some("clang".to_owned()),
            ar: None,
            cflags: Some(vec!["-std=c11".to_owned()]),
            ldflags: Some(vec!["-lm".to_owned()]),
        };
        let toolchain = Toolchain::from_config(&config);
        assert_eq!(toolchain.cc, "clang");
        assert_eq!(toolchain.ar, "ar");
        assert_eq!(toolchain.cflags, ["-std=c11"]);
        assert_eq!(toolchain.ldflags, ["-lm"]);
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let toolchain = Toolchain::default().with_env_overrides(|_| Some(OsString::new()));
        assert_eq!(toolchain, Toolchain::default());
    }
}
