//! Per-platform artifact generators.
//!
//! A generator turns one [`UnitContext`] into artifacts. Generators are
//! object-safe so a [`GeneratorSet`](crate::registry::GeneratorSet) can hold
//! platform-specific ones as `Box<dyn ArtifactGenerator>`.

pub mod entry;
pub mod native;
pub mod zephyr;

use std::fmt;
use std::net::Ipv6Addr;

use ucgen_targets::{DeploymentContext, PlatformKind, ProjectSection, SizingHints, TargetOptions};

use crate::artifact::ArtifactSet;
use crate::board::BoardQuirkTable;
use crate::compose::ConfigComposer;
use crate::error::Result;
use crate::workspace::WorkspaceProbe;

pub use entry::MainGenerator;
pub use native::{DescriptorFlavor, NativeBuildGenerator};
pub use zephyr::ZephyrGenerator;

/// Fixed same-host address used by federates on the TCP/IPv4 transport.
pub const LOOPBACK_IPV4: &str = "127.0.0.1";

/// Where the system configuration of a platform lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemConfigLayout {
    /// Generated defaults in one file plus a user override file that the
    /// downstream build tool itself layers on top.
    Split {
        generated: &'static str,
        user_override: &'static str,
    },
    /// One file holding generated defaults with any workspace overlay of the
    /// same name merged in.
    Combined { file: &'static str },
}

impl SystemConfigLayout {
    /// File the generated configuration is written to.
    pub fn generated_file(&self) -> &'static str {
        match self {
            Self::Split { generated, .. } => generated,
            Self::Combined { file } => file,
        }
    }

    /// User override file recognized by the downstream tool, if split.
    pub fn user_override(&self) -> Option<&'static str> {
        match self {
            Self::Split { user_override, .. } => Some(user_override),
            Self::Combined { .. } => None,
        }
    }
}

/// Network branch of a deployment unit's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitNetwork {
    /// Standalone application.
    None,
    /// Federate on the TCP/IPv4 transport, bound to [`LOOPBACK_IPV4`].
    Loopback,
    /// Federate on the 6LoWPAN transport with its assigned address.
    Ipv6(Ipv6Addr),
}

/// Everything a generator needs to know about one deployment unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext<'a> {
    pub project: &'a ProjectSection,
    pub options: &'a TargetOptions,
    pub context: DeploymentContext<'a>,
    /// Resolved platform of this unit.
    pub platform: PlatformKind,
    pub sizing: SizingHints,
    pub network: UnitNetwork,
    pub layout: SystemConfigLayout,
    /// Generated project directory of this unit.
    pub project_root: &'a str,
    pub workspace: &'a dyn WorkspaceProbe,
    pub boards: &'a BoardQuirkTable,
    pub composer: &'a ConfigComposer,
}

impl<'a> UnitContext<'a> {
    pub fn main_name(&self) -> &'a str {
        self.project.main_name()
    }

    /// `project()` name of this unit.
    pub fn project_name(&self) -> String {
        self.context.project_name(self.main_name())
    }

    pub fn federate_name(&self) -> Option<&'a str> {
        self.context.federate().map(|f| f.name.as_str())
    }

    /// Name of the native executable target.
    pub fn native_target(&self) -> String {
        match self.federate_name() {
            Some(federate) => format!("{}_{federate}", self.project.name),
            None => self.project.name.clone(),
        }
    }

    /// Board of this unit: the federate override, else the target-wide board.
    pub fn selected_board(&self) -> Option<&'a str> {
        self.federate_board().or_else(|| self.options.board_name())
    }

    /// Board override of the federate, if any.
    pub fn federate_board(&self) -> Option<&'a str> {
        self.context.federate().and_then(|f| f.board_name())
    }
}

/// Emits part of a deployment unit's artifact set.
pub trait ArtifactGenerator: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Add this generator's artifacts for `unit` to `out`. Paths are relative
    /// to the unit directory.
    fn generate(&self, unit: &UnitContext<'_>, out: &mut ArtifactSet) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::workspace::NoWorkspace;
    use ucgen_targets::FederateDescriptor;

    /// Owned inputs from which [`UnitContext`]s can be borrowed in tests.
    pub struct Fixture {
        pub project: ProjectSection,
        pub options: TargetOptions,
        pub boards: BoardQuirkTable,
        pub composer: ConfigComposer,
    }

    impl Fixture {
        pub fn new(options: TargetOptions) -> Self {
            let mut project = ProjectSection::new("App");
            project.main = Some("Main".into());
            Self {
                project,
                options,
                boards: BoardQuirkTable::builtin(),
                composer: ConfigComposer::new(),
            }
        }

        pub fn unit<'a>(
            &'a self,
            federate: Option<&'a FederateDescriptor>,
            network: UnitNetwork,
            layout: SystemConfigLayout,
            workspace: &'a dyn WorkspaceProbe,
        ) -> UnitContext<'a> {
            let context = match federate {
                Some(fed) => DeploymentContext::Federated(fed),
                None => DeploymentContext::Standalone,
            };
            UnitContext {
                project: &self.project,
                options: &self.options,
                context,
                platform: context.resolve_platform(&self.options),
                sizing: SizingHints::new(8, 12),
                network,
                layout,
                project_root: "/out/App",
                workspace,
                boards: &self.boards,
                composer: &self.composer,
            }
        }
    }

    pub static NO_WORKSPACE: NoWorkspace = NoWorkspace;
}
