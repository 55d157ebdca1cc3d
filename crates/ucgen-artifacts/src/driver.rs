//! Per-deployment-unit orchestration.
//!
//! A standalone program is one unit generated into `<app>/`. A federation
//! is one pass over its federates, each generated into `<app>/<federate>/`,
//! plus an optional launch script at `<app>/bin/<app>`.

use std::net::Ipv6Addr;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use ucgen_targets::{
    DeploymentContext, FederateDescriptor, FederationSettings, PlatformKind, ProjectManifest,
};

use crate::alloc::{AddressAllocator, SharedAllocator};
use crate::artifact::{ArtifactSet, GeneratedArtifact};
use crate::board::BoardQuirkTable;
use crate::compose::ConfigComposer;
use crate::error::Result;
use crate::generator::{UnitContext, UnitNetwork};
use crate::launch::LaunchScript;
use crate::registry::{BuildPlan, PlatformRegistry};
use crate::workspace::WorkspaceProbe;

/// How federate address numbering relates across federation passes.
#[derive(Debug, Clone, Default)]
pub enum Numbering {
    /// A fresh allocator for every pass.
    #[default]
    PerPass,
    /// Continue numbering in a shared allocator. The pass holds its lock
    /// from the first reservation to the last allocation.
    Shared(SharedAllocator),
}

impl Numbering {
    /// Numbering selected by manifest settings; shared numbering uses the process-wide allocator.
    pub fn for_settings(settings: &FederationSettings) -> Self {
        if settings.shared_numbering {
            Self::Shared(SharedAllocator::process_wide())
        } else {
            Self::PerPass
        }
    }
}

/// Inputs of one generation run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub manifest: &'a ProjectManifest,
    pub workspace: &'a dyn WorkspaceProbe,
    /// Directory the artifacts will be written below. Only used to compute
    /// `PROJECT_ROOT`; nothing is written by generation.
    pub output_root: &'a Path,
}

/// What was generated for one deployment unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutput {
    /// Federate name, `None` when standalone.
    pub federate: Option<String>,
    /// Unit directory relative to the output root.
    pub directory: String,
    pub platform: PlatformKind,
    pub plan: BuildPlan,
    /// Assigned IPv6 address on the 6LoWPAN transport.
    pub address: Option<Ipv6Addr>,
    /// Artifact paths relative to the output root.
    pub artifacts: Vec<String>,
}

/// All artifacts of one run, not yet written.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub units: Vec<UnitOutput>,
    pub artifacts: ArtifactSet,
}

impl GenerationOutput {
    /// Write every artifact below `root`.
    pub fn write_all(&self, root: &Path) -> Result<Vec<PathBuf>> {
        self.artifacts.write_all(root)
    }
}

/// Top-level orchestration over the registry, board table and composer.
#[derive(Debug, Clone)]
pub struct PlatformDriver {
    registry: PlatformRegistry,
    boards: BoardQuirkTable,
    composer: ConfigComposer,
    numbering: Option<Numbering>,
}

impl Default for PlatformDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformDriver {
    /// A driver with the built-in registry and board table.
    pub fn new() -> Self {
        Self {
            registry: PlatformRegistry::builtin(),
            boards: BoardQuirkTable::builtin(),
            composer: ConfigComposer::new(),
            numbering: None,
        }
    }

    pub fn with_registry(mut self, registry: PlatformRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_boards(mut self, boards: BoardQuirkTable) -> Self {
        self.boards = boards;
        self
    }

    pub fn with_composer(mut self, composer: ConfigComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Override the numbering the manifest's federation settings select.
    pub fn with_numbering(mut self, numbering: Numbering) -> Self {
        self.numbering = Some(numbering);
        self
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn boards(&self) -> &BoardQuirkTable {
        &self.boards
    }

    /// Compose every artifact of the program in memory.
    pub fn generate(&self, request: &GenerationRequest<'_>) -> Result<GenerationOutput> {
        let manifest = request.manifest;
        let mut output = GenerationOutput::default();
        if !manifest.is_federated() {
            let directory = manifest.project.name.clone();
            self.generate_unit(
                request,
                DeploymentContext::Standalone,
                UnitNetwork::None,
                directory,
                &mut output,
            )?;
            return Ok(output);
        }

        let numbering = self
            .numbering
            .clone()
            .unwrap_or_else(|| Numbering::for_settings(&manifest.federation));
        match numbering {
            Numbering::PerPass => {
                let mut allocator = AddressAllocator::new();
                self.federation_pass(request, &mut allocator, &mut output)?;
            }
            Numbering::Shared(shared) => {
                let mut allocator = shared.lock()?;
                self.federation_pass(request, &mut allocator, &mut output)?;
            }
        }
        Ok(output)
    }

    fn federation_pass(
        &self,
        request: &GenerationRequest<'_>,
        allocator: &mut AddressAllocator,
        output: &mut GenerationOutput,
    ) -> Result<()> {
        let manifest = request.manifest;
        let app = manifest.project.name.as_str();
        let constrained = manifest.target.net_interface.value.is_constrained();
        let federates = ordered_federates(manifest);
        info!(
            app,
            federates = federates.len(),
            transport = %manifest.target.net_interface.value,
            "generating federation"
        );

        if constrained {
            for federate in &federates {
                for address in federate.ipv6_shaped_addresses() {
                    debug!(federate = %federate.name, address, "reserving declared address");
                    allocator.mark_as_used(address);
                }
            }
        }

        for &federate in &federates {
            let network = if constrained {
                let address = match federate.explicit_ipv6() {
                    Some(address) => address,
                    None => allocator.next_address()?,
                };
                UnitNetwork::Ipv6(address)
            } else {
                UnitNetwork::Loopback
            };
            let directory = format!("{app}/{}", federate.name);
            self.generate_unit(
                request,
                DeploymentContext::Federated(federate),
                network,
                directory,
                output,
            )?;
        }

        let options = &manifest.target;
        if options.resolved_platform() == PlatformKind::Native && !options.no_compile.value {
            let script = LaunchScript::new(app, federates.iter().map(|f| f.name.clone()));
            let path = format!("{app}/{}", script.path());
            info!(path = %path, "generating launch script for native federation");
            output
                .artifacts
                .push(GeneratedArtifact::new(path, script.to_string()).executable());
        }
        Ok(())
    }

    fn generate_unit(
        &self,
        request: &GenerationRequest<'_>,
        context: DeploymentContext<'_>,
        network: UnitNetwork,
        directory: String,
        output: &mut GenerationOutput,
    ) -> Result<()> {
        let manifest = request.manifest;
        let options = &manifest.target;
        let platform = context.resolve_platform(options);
        if options.net_interface.value.is_constrained() && platform != PlatformKind::Zephyr {
            warn!(%platform, unit = %directory, "6LoWPAN transport selected for a non-Zephyr unit");
        }
        let set = self.registry.generators_for(platform);
        let sizing = match context.federate() {
            Some(federate) => manifest.sizing_for(federate),
            None => manifest.sizing,
        };
        let project_root = request.output_root.join(&directory).display().to_string();
        let unit = UnitContext {
            project: &manifest.project,
            options,
            context,
            platform,
            sizing,
            network,
            layout: set.layout,
            project_root: &project_root,
            workspace: request.workspace,
            boards: &self.boards,
            composer: &self.composer,
        };

        let mut artifacts = ArtifactSet::new();
        for generator in set.generators() {
            debug!(generator = generator.name(), unit = %directory, "running generator");
            generator.generate(&unit, &mut artifacts)?;
        }

        let paths: Vec<String> = artifacts
            .iter()
            .map(|a| format!("{directory}/{}", a.path))
            .collect();
        info!(unit = %directory, %platform, artifacts = paths.len(), "generated deployment unit");
        output.artifacts.extend_under(&directory, artifacts);
        output.units.push(UnitOutput {
            federate: context.federate().map(|f| f.name.clone()),
            directory,
            platform,
            plan: set.plan,
            address: match network {
                UnitNetwork::Ipv6(address) => Some(address),
                _ => None,
            },
            artifacts: paths,
        });
        Ok(())
    }
}

/// Federates in ordinal order, ties broken by name.
fn ordered_federates(manifest: &ProjectManifest) -> Vec<&FederateDescriptor> {
    let mut federates: Vec<&FederateDescriptor> = manifest.federates.iter().collect();
    federates.sort_by(|a, b| {
        a.ordinal
            .unwrap_or(usize::MAX)
            .cmp(&b.ordinal.unwrap_or(usize::MAX))
            .then_with(|| a.name.cmp(&b.name))
    });
    federates
}
