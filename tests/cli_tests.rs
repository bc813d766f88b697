//! Unit tests for CLI argument parsing.
//!
//! Exercises [`globuild::cli`] with `rstest` for parameterised coverage of
//! success and error scenarios.
use clap::Parser;
use clap::error::ErrorKind;
use globuild::BuildMode;
use globuild::cli::{BuildArgs, Cli, Commands};
use rstest::rstest;
use std::path::PathBuf;

fn build(dry_run: bool, targets: &[&str]) -> Commands {
    Commands::Build(BuildArgs {
        dry_run,
        targets: targets.iter().map(|t| (*t).to_owned()).collect(),
    })
}

#[rstest]
#[case(
    vec!["globuild"],
    PathBuf::from("Globuildfile"),
    None,
    false,
    BuildMode::Debug,
    build(false, &[]),
)]
#[case(
    vec!["globuild", "--file", "alt.yml", "-C", "work", "build", "libds.a", "test_llist"],
    PathBuf::from("alt.yml"),
    Some(PathBuf::from("work")),
    false,
    BuildMode::Debug,
    build(false, &["libds.a", "test_llist"]),
)]
#[case(
    vec!["globuild", "--verbose", "--mode", "release"],
    PathBuf::from("Globuildfile"),
    None,
    true,
    BuildMode::Release,
    build(false, &[]),
)]
#[case(
    vec!["globuild", "build", "--dry-run", "libds.a"],
    PathBuf::from("Globuildfile"),
    None,
    false,
    BuildMode::Debug,
    build(true, &["libds.a"]),
)]
#[case(
    vec!["globuild", "graph"],
    PathBuf::from("Globuildfile"),
    None,
    false,
    BuildMode::Debug,
    Commands::Graph,
)]
#[case(
    vec!["globuild", "-f", "b.yml", "clean"],
    PathBuf::from("b.yml"),
    None,
    false,
    BuildMode::Debug,
    Commands::Clean,
)]
fn parse_cli(
    #[case] argv: Vec<&str>,
    #[case] file: PathBuf,
    #[case] directory: Option<PathBuf>,
    #[case] verbose: bool,
    #[case] mode: BuildMode,
    #[case] expected_cmd: Commands,
) {
    let cli = Cli::parse_from(argv).with_default_command();
    assert_eq!(cli.file, file);
    assert_eq!(cli.directory, directory);
    assert_eq!(cli.verbose, verbose);
    assert_eq!(cli.mode, mode);
    assert_eq!(cli.command.expect("command should be set"), expected_cmd);
}

#[rstest]
#[case(vec!["globuild", "unknowncmd"], ErrorKind::InvalidSubcommand)]
#[case(vec!["globuild", "--file"], ErrorKind::InvalidValue)]
#[case(vec!["globuild", "--mode", "fast"], ErrorKind::InvalidValue)]
#[case(vec!["globuild", "graph", "extra"], ErrorKind::UnknownArgument)]
fn parse_cli_errors(#[case] argv: Vec<&str>, #[case] expected_error: ErrorKind) {
    let err = Cli::try_parse_from(argv).expect_err("unexpected success");
    assert_eq!(err.kind(), expected_error);
}

#[test]
fn default_cli_builds_everything() {
    let cli = Cli::default();
    assert_eq!(cli.file, PathBuf::from("Globuildfile"));
    assert_eq!(cli.command, Some(build(false, &[])));
}
