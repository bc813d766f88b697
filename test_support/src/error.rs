//! Error formatting helpers for stable test assertions.

use std::error::Error;

/// Join an error and its sources, outermost first, with `": "`.
///
/// ```
/// let err = std::io::Error::other("oops");
/// assert_eq!(test_support::display_error_chain(&err), "oops");
/// ```
pub fn display_error_chain(e: &(dyn Error + 'static)) -> String {
    let mut current: Option<&(dyn Error + 'static)> = Some(e);
    std::iter::from_fn(|| {
        let err = current?;
        current = err.source();
        Some(err.to_string())
    })
    .collect::<Vec<_>>()
    .join(": ")
}
