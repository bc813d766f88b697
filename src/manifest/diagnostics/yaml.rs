//! Source-located diagnostics for `serde_saphyr` failures.

// The unused_assignments lint from the miette/thiserror derives fires in some
// Rust versions but not others, so `#[expect]` cannot be used here.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_saphyr::{Error as YamlError, Location};
use thiserror::Error;

use super::{ManifestName, ManifestSource};
use crate::manifest::hints::{TAB_HINT, YAML_HINTS};

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(globuild::manifest::yaml))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

/// Byte offset of a one-based line and column, clamped to the line's end.
fn offset_of(src: &str, line: u64, column: u64) -> usize {
    let wanted_line = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
    let wanted_column = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    let mut line_start = 0;
    for (idx, segment) in src.split_inclusive('\n').enumerate() {
        if idx == wanted_line {
            let text = segment.trim_end_matches(['\n', '\r']);
            return line_start
                + text
                    .char_indices()
                    .nth(wanted_column)
                    .map_or(text.len(), |(byte, _)| byte);
        }
        line_start += segment.len();
    }
    src.len()
}

/// One-character span at `loc`, or a zero-width span at a line end.
fn span_at(src: &str, loc: Location) -> SourceSpan {
    let at = offset_of(src, loc.line(), loc.column());
    let len = src
        .get(at..)
        .and_then(|rest| rest.chars().next())
        .filter(|ch| !matches!(ch, '\n' | '\r'))
        .map_or(0, char::len_utf8);
    SourceSpan::new(at.into(), len)
}

fn indented_with_tab(src: &str, loc: Location) -> bool {
    let idx = usize::try_from(loc.line().saturating_sub(1)).unwrap_or(usize::MAX);
    src.lines()
        .nth(idx)
        .is_some_and(|line| line.chars().take_while(|c| c.is_whitespace()).any(|c| c == '\t'))
}

fn hint_for(detail: &str, src: &str, loc: Option<Location>) -> Option<String> {
    if loc.is_some_and(|at| indented_with_tab(src, at)) {
        return Some(TAB_HINT.to_owned());
    }
    let lower = detail.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, hint)| (*hint).to_owned())
}

/// Map a `serde_saphyr` error into a [`miette`] diagnostic.
///
/// Syntax and schema errors both carry a location, which becomes the labelled
/// span. Common mistakes such as tab indentation get a hint.
#[must_use]
pub fn map_yaml_error(
    err: YamlError,
    src: &ManifestSource,
    name: &ManifestName,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let loc = err.location();
    let (line, column) = loc.map_or((1, 1), |at| (at.line(), at.column()));
    let detail = err.to_string();
    let help = hint_for(&detail, src.as_str(), loc);

    Box::new(YamlDiagnostic {
        src: NamedSource::new(name.as_str(), src.as_str().to_owned()),
        span: loc.map(|at| span_at(src.as_str(), at)),
        help,
        message: format!("{name}:{line}:{column}: {detail}"),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn diagnose(yaml: &str) -> Box<dyn Diagnostic + Send + Sync + 'static> {
        let err = serde_saphyr::from_str::<serde_json::Value>(yaml).expect_err("invalid YAML");
        map_yaml_error(err, &ManifestSource::from(yaml), &ManifestName::from("Globuildfile"))
    }

    #[test]
    fn tab_indentation_gets_a_hint() {
        let diag = diagnose("artifacts:\n\t- name: \"unterminated");
        let help = diag.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("spaces"), "unexpected help: {help}");
    }

    #[test]
    fn message_names_the_manifest() {
        let diag = diagnose("artifacts: [\n");
        assert!(diag.to_string().starts_with("Globuildfile:"), "{diag}");
        assert_eq!(
            diag.code().map(|c| c.to_string()).as_deref(),
            Some("globuild::manifest::yaml")
        );
    }

    #[rstest]
    #[case("one\ntwo\nthree", 3, 3, 10)]
    #[case("one\r\ntwo", 2, 2, 6)]
    #[case("short", 1, 42, 5)]
    #[case("k\u{e9}y: v", 1, 3, 3)]
    fn offsets_follow_characters(
        #[case] src: &str,
        #[case] line: u64,
        #[case] column: u64,
        #[case] expected: usize,
    ) {
        assert_eq!(offset_of(src, line, column), expected);
    }
}
