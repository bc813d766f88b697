#![forbid(unsafe_code)]

//! Environment variable names shared across globuild crates (library, tests,
//! and helpers).

/// Environment variable override for the C compiler driver.
///
/// # Examples
///
/// ```
/// use toolchain_env::CC_ENV;
/// assert_eq!(CC_ENV, "GLOBUILD_CC");
/// ```
pub const CC_ENV: &str = "GLOBUILD_CC";

/// Environment variable override for the static archiver.
///
/// # Examples
///
/// ```
/// use toolchain_env::AR_ENV;
/// assert_eq!(AR_ENV, "GLOBUILD_AR");
/// ```
pub const AR_ENV: &str = "GLOBUILD_AR";
