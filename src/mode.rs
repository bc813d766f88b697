//! Build mode selection.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Named configuration selecting the object namespace and compiler flags.
///
/// The mode never changes graph topology, only output paths and action
/// parameters.
///
/// ```
/// use globuild::BuildMode;
/// assert_eq!(BuildMode::Debug.dir_name(), "dbg");
/// assert_eq!(BuildMode::Release.compile_flags(), ["-O2", "-DNDEBUG"]);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Unoptimised build with debug information.
    #[default]
    Debug,
    /// Optimised build without assertions.
    Release,
}

impl BuildMode {
    /// Directory name used to namespace derived objects.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "dbg",
            Self::Release => "rls",
        }
    }

    /// Flags passed to the compiler when producing objects and executables.
    #[must_use]
    pub const fn compile_flags(self) -> &'static [&'static str] {
        match self {
            Self::Debug => &["-g"],
            Self::Release => &["-O2", "-DNDEBUG"],
        }
    }
}

impl Display for BuildMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => f.write_str("debug"),
            Self::Release => f.write_str("release"),
        }
    }
}
