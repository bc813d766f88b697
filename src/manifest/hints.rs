/// Hint shown when a failing line is indented with tabs.
pub(crate) const TAB_HINT: &str = "Use spaces for indentation; tabs are invalid in YAML.";

/// Error-message fragments paired with a suggestion.
pub(crate) const YAML_HINTS: [(&str, &str); 5] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or quote values containing ':'.",
    ),
    (
        "unknown field",
        "Check the key's spelling; unknown keys are rejected.",
    ),
    (
        "unknown variant",
        "Artifact kinds are static_library, shared_library, and executable.",
    ),
    (
        "missing field",
        "Every artifact needs a name, a kind, and its inputs.",
    ),
];
