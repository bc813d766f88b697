//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal: [`run`] loads the manifest, assembles
//! the graph, and hands it to the selected command.

mod error;
mod path_helpers;

pub use error::RunnerError;

use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{Level, debug, info};

use crate::ast::GlobuildManifest;
use crate::cli::{BuildArgs, Cli, Commands};
use crate::error::BuildError;
use crate::executor::{Toolchain, ToolchainExecutor};
use crate::graph::{BuildGraph, GraphBuilder};
use crate::manifest::{self, ManifestError};
use crate::scheduler::BuildScheduler;
use crate::status::{ConsoleReporter, StatusReporter};
use crate::{clean, dot};

use path_helpers::{resolve_manifest_path, resolve_project_root};

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the graph cannot be
/// assembled, or the command itself fails.
pub fn run(cli: &Cli) -> Result<()> {
    let root = resolve_project_root(cli)?;
    let manifest_path = resolve_manifest_path(cli, &root)?;
    let manifest = manifest::from_path(&manifest_path)?;
    if tracing::enabled!(Level::DEBUG) {
        let ast_json =
            serde_json::to_string_pretty(&manifest).context("failed to serialise manifest")?;
        debug!("AST:\n{ast_json}");
    }

    let graph = GraphBuilder::from_manifest(&manifest, root.clone(), cli.mode)?.finish()?;
    let reporter = ConsoleReporter::new(root);

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Build(BuildArgs::default()));
    match command {
        Commands::Build(args) if args.dry_run => handle_dry_run(&graph, &args),
        Commands::Build(args) => handle_build(&graph, &manifest, &args, &reporter),
        Commands::Graph => handle_graph(&graph),
        Commands::Clean => handle_clean(&graph, &reporter),
    }
}

fn handle_build(
    graph: &BuildGraph,
    manifest: &GlobuildManifest,
    args: &BuildArgs,
    reporter: &dyn StatusReporter,
) -> Result<()> {
    let toolchain = Toolchain::from_config(&manifest.toolchain).with_process_env();
    info!(cc = %toolchain.cc, ar = %toolchain.ar, mode = %graph.mode(), "starting build");
    let mut executor = ToolchainExecutor::new(toolchain);
    BuildScheduler::new(graph)
        .with_reporter(reporter)
        .run_targets(&args.targets, &mut executor)?;
    Ok(())
}

/// Print the outputs a build would produce, one per line.
fn handle_dry_run(graph: &BuildGraph, args: &BuildArgs) -> Result<()> {
    let stale = BuildScheduler::new(graph).plan(&args.targets)?;
    let mut out = io::stdout().lock();
    for id in stale {
        writeln!(out, "{}", graph.display_path(id)).context("failed to write plan")?;
    }
    Ok(())
}

fn handle_graph(graph: &BuildGraph) -> Result<()> {
    let rendered = dot::generate(graph).context("failed to render graph")?;
    io::stdout()
        .lock()
        .write_all(rendered.as_bytes())
        .context("failed to write graph")
}

fn handle_clean(graph: &BuildGraph, reporter: &dyn StatusReporter) -> Result<()> {
    let removed = clean::remove_outputs(graph, reporter)?;
    info!(count = removed.len(), "removed outputs");
    Ok(())
}

/// Render `err` for the terminal.
///
/// Errors raised by this crate are shown as [`miette`] diagnostics, codes
/// and help included; anything else falls back to the `anyhow` chain.
#[must_use]
pub fn render_error(err: anyhow::Error) -> String {
    match into_report(err) {
        Ok(report) => format!("{report:?}"),
        Err(other) => format!("Error: {other:?}"),
    }
}

fn into_report(err: anyhow::Error) -> Result<miette::Report, anyhow::Error> {
    let not_build = match err.downcast::<BuildError>() {
        Ok(build) => return Ok(miette::Report::new(build)),
        Err(other) => other,
    };
    let not_manifest = match not_build.downcast::<ManifestError>() {
        Ok(parse) => return Ok(miette::Report::new(parse)),
        Err(other) => other,
    };
    not_manifest.downcast::<RunnerError>().map(miette::Report::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutionError;

    #[test]
    fn build_errors_render_with_their_code() {
        let err = anyhow::Error::new(BuildError::UnknownTarget {
            name: "libnope.a".to_owned(),
        });
        let rendered = render_error(err);
        assert!(rendered.contains("unknown target `libnope.a`"), "{rendered}");
        assert!(rendered.contains("globuild::scheduler::unknown_target"), "{rendered}");
    }

    #[test]
    fn executor_diagnostics_are_shown_once() {
        let err = anyhow::Error::new(BuildError::ExecutionFailed {
            path: "obj/dbg/llist.o".into(),
            source: ExecutionError::Rejected {
                message: "llist.c:3:1: error: expected ';'".to_owned(),
            },
        });
        let rendered = render_error(err);
        assert_eq!(rendered.matches("expected ';'").count(), 1, "{rendered}");
        assert!(rendered.contains("building obj/dbg/llist.o failed"), "{rendered}");
    }

    #[test]
    fn foreign_errors_fall_back_to_the_chain() {
        let err = anyhow::anyhow!("disk on fire").context("failed to read manifest");
        let rendered = render_error(err);
        assert!(rendered.starts_with("Error: failed to read manifest"), "{rendered}");
        assert!(rendered.contains("disk on fire"), "{rendered}");
    }
}
