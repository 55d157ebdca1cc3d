//! Platform to generator-set dispatch.
//!
//! The registry maps a resolved [`PlatformKind`] to a constructor of its
//! [`GeneratorSet`]. Kinds without an entry use the explicit fallback
//! constructor (the common native path), so a newly added platform is
//! generated like the native one until it is registered.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;
use ucgen_targets::PlatformKind;

use crate::generator::{
    ArtifactGenerator, DescriptorFlavor, MainGenerator, NativeBuildGenerator, SystemConfigLayout,
    ZephyrGenerator,
};
use crate::main_gen::MainFlavor;

/// Structural decisions that differ per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlan {
    /// Whether the common native build files are generated at all.
    pub native_build_files: bool,
    /// Clean the build directory before every build.
    pub clean_build_directory: bool,
    /// Whether an install target is offered.
    pub install_target: bool,
}

impl BuildPlan {
    /// The common native path.
    pub const NATIVE: BuildPlan = BuildPlan {
        native_build_files: true,
        clean_build_directory: false,
        install_target: true,
    };

    /// Platforms whose own build tooling replaces the native build files.
    pub const RTOS_TOOLING: BuildPlan = BuildPlan {
        native_build_files: false,
        clean_build_directory: true,
        install_target: false,
    };
}

/// The generators and structural choices for one platform.
#[derive(Debug)]
pub struct GeneratorSet {
    pub platform: PlatformKind,
    pub main: MainGenerator,
    /// Present exactly when [`BuildPlan::native_build_files`] is set.
    pub native: Option<NativeBuildGenerator>,
    /// Platform-specific scaffolding beyond (or instead of) the native files.
    pub platform_artifacts: Option<Box<dyn ArtifactGenerator>>,
    pub layout: SystemConfigLayout,
    pub plan: BuildPlan,
}

impl GeneratorSet {
    /// The common native path for `platform`.
    pub fn common(platform: PlatformKind) -> Self {
        Self {
            platform,
            main: MainGenerator::new(MainFlavor::Default),
            native: Some(NativeBuildGenerator::new(DescriptorFlavor::Native)),
            platform_artifacts: None,
            layout: SystemConfigLayout::Combined { file: "lf.conf" },
            plan: BuildPlan::NATIVE,
        }
    }

    pub fn freertos(platform: PlatformKind) -> Self {
        Self {
            main: MainGenerator::new(MainFlavor::FreeRtos),
            ..Self::common(platform)
        }
    }

    pub fn esp_idf(platform: PlatformKind) -> Self {
        Self {
            main: MainGenerator::new(MainFlavor::EspIdf),
            native: Some(NativeBuildGenerator::new(DescriptorFlavor::EspIdf)),
            layout: SystemConfigLayout::Combined {
                file: "sdkconfig.defaults",
            },
            ..Self::common(platform)
        }
    }

    pub fn riot(platform: PlatformKind) -> Self {
        Self {
            layout: SystemConfigLayout::Combined { file: "app.config" },
            ..Self::common(platform)
        }
    }

    pub fn zephyr(platform: PlatformKind) -> Self {
        Self {
            platform,
            main: MainGenerator::new(MainFlavor::Default),
            native: None,
            platform_artifacts: Some(Box::new(ZephyrGenerator)),
            layout: SystemConfigLayout::Split {
                generated: "prj_lf.conf",
                user_override: "prj.conf",
            },
            plan: BuildPlan::RTOS_TOOLING,
        }
    }

    /// Every generator of the set, in generation order.
    pub fn generators(&self) -> Vec<&dyn ArtifactGenerator> {
        let mut generators: Vec<&dyn ArtifactGenerator> = vec![&self.main];
        if let Some(native) = &self.native {
            generators.push(native);
        }
        if let Some(platform) = &self.platform_artifacts {
            generators.push(platform.as_ref());
        }
        generators
    }
}

/// Constructor of a platform's generator set.
pub type GeneratorSetFactory = fn(PlatformKind) -> GeneratorSet;

/// Dispatch table from platform kind to generator-set constructor.
#[derive(Clone)]
pub struct PlatformRegistry {
    entries: BTreeMap<PlatformKind, GeneratorSetFactory>,
    fallback: GeneratorSetFactory,
}

impl fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("registered", &self.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PlatformRegistry {
    /// A registry with no entries: every platform takes the fallback.
    pub fn empty(fallback: GeneratorSetFactory) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback,
        }
    }

    /// The built-in platforms. Native and RP2040 take the common fallback.
    pub fn builtin() -> Self {
        let mut registry = Self::empty(GeneratorSet::common);
        registry.register(PlatformKind::FreeRtos, GeneratorSet::freertos);
        registry.register(PlatformKind::EspIdf, GeneratorSet::esp_idf);
        registry.register(PlatformKind::Zephyr, GeneratorSet::zephyr);
        registry.register(PlatformKind::Riot, GeneratorSet::riot);
        registry
    }

    /// Register (or replace) the constructor for `platform`.
    pub fn register(&mut self, platform: PlatformKind, factory: GeneratorSetFactory) {
        self.entries.insert(platform, factory);
    }

    pub fn is_registered(&self, platform: PlatformKind) -> bool {
        self.entries.contains_key(&platform)
    }

    /// Generator set for a resolved platform.
    ///
    /// `Auto` is resolved to [`PlatformKind::FALLBACK`] first.
    pub fn generators_for(&self, platform: PlatformKind) -> GeneratorSet {
        let platform = platform.resolve(PlatformKind::Auto);
        match self.entries.get(&platform) {
            Some(factory) => factory(platform),
            None => {
                debug!(%platform, "no registered generator set, using the common native path");
                (self.fallback)(platform)
            }
        }
    }
}
