//! Make-style variables script (`make/lf.mk`) for the common native path.

use std::fmt;

use ucgen_targets::{PlatformKind, SizingHints};

/// Relative path of the make script inside a unit directory.
pub const MAKE_SCRIPT_PATH: &str = "make/lf.mk";

/// Variables handed to make-based downstream builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeScript {
    pub main_name: String,
    pub main_target: String,
    pub platform: PlatformKind,
    pub sizing: SizingHints,
    pub federate: Option<String>,
    /// Generated entry-point source the build compiles.
    pub main_source: String,
}

impl fmt::Display for MakeScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Generated file, do not edit.")?;
        writeln!(f, "LF_MAIN ?= {}", self.main_name)?;
        writeln!(f, "LF_MAIN_TARGET ?= {}", self.main_target)?;
        writeln!(f, "LF_PLATFORM ?= {}", self.platform.build_system_name())?;
        writeln!(f, "EVENT_QUEUE_SIZE = {}", self.sizing.events)?;
        writeln!(f, "REACTION_QUEUE_SIZE = {}", self.sizing.reactions)?;
        if let Some(federate) = &self.federate {
            writeln!(f, "FEDERATE = {federate}")?;
        }
        writeln!(f, "LF_GEN_MAIN = {}", self.main_source)
    }
}
