//! Command line interface definition using clap.
//!
//! [`Cli`] carries the global options and an optional subcommand; `build` is
//! assumed when none is given.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::manifest::DEFAULT_MANIFEST;
use crate::mode::BuildMode;

/// Builds small C projects from a YAML manifest, finding sources by name.
#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the manifest, relative to the project directory.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_MANIFEST)]
    pub file: PathBuf,

    /// Run as if started in this directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Build mode selecting object directories and compiler flags.
    #[arg(long, value_enum, default_value_t = BuildMode::Debug)]
    pub mode: BuildMode,

    /// Subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs::default()));
        }
        self
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_MANIFEST),
            directory: None,
            verbose: false,
            mode: BuildMode::Debug,
            command: None,
        }
        .with_default_command()
    }
}

/// Arguments accepted by the `build` command.
#[derive(Debug, Clone, Default, Args, PartialEq, Eq)]
pub struct BuildArgs {
    /// List what would be rebuilt without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Artifact names or output paths to build; all artifacts when empty.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Bring artifacts up to date (default).
    Build(BuildArgs),

    /// Print the dependency graph in Graphviz DOT format.
    Graph,

    /// Remove compiled units and artifacts.
    Clean,
}
