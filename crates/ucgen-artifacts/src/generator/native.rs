//! The common native build path.
//!
//! Used by every platform whose generator set does not replace the native
//! build files: a CMake descriptor, a make script and one combined
//! system-configuration file.

use tracing::debug;

use super::{ArtifactGenerator, UnitContext, UnitNetwork, LOOPBACK_IPV4};
use crate::artifact::{ArtifactSet, GeneratedArtifact};
use crate::cmake::{build_descriptor, env, CmakeDocument, DescriptorIdentity, DescriptorOptions};
use crate::compose::merge_with_workspace_overlay;
use crate::config::ConfigFragment;
use crate::error::Result;
use crate::main_gen::MAIN_SOURCE_PATH;
use crate::make::{MakeScript, MAKE_SCRIPT_PATH};
use ucgen_targets::PlatformKind;

/// Network buffer count for federates on the 6LoWPAN transport.
const IPV6_NET_BUF_COUNT: i64 = 16;

/// Build-descriptor flavour of the native path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DescriptorFlavor {
    /// Plain CMake project with an explicit executable target.
    #[default]
    Native,
    /// ESP-IDF project; the SDK creates the `<project>.elf` target.
    EspIdf,
}

/// Emits `CMakeLists.txt`, `make/lf.mk` and the combined system configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBuildGenerator {
    pub flavor: DescriptorFlavor,
    pub install_target: bool,
}

impl NativeBuildGenerator {
    /// The ESP-IDF build owns its `<project>.elf` target, so only the native
    /// flavour installs.
    pub fn new(flavor: DescriptorFlavor) -> Self {
        Self {
            flavor,
            install_target: flavor == DescriptorFlavor::Native,
        }
    }

    fn main_target(&self, unit: &UnitContext<'_>) -> String {
        match self.flavor {
            DescriptorFlavor::Native => unit.native_target(),
            DescriptorFlavor::EspIdf => format!("{}.elf", unit.project_name()),
        }
    }

    fn init_block(&self, unit: &UnitContext<'_>) -> CmakeDocument {
        let doc = CmakeDocument::new().set_cache(
            "PLATFORM",
            unit.platform.build_system_name(),
            "Platform to target",
        );
        match (self.flavor, unit.selected_board()) {
            (DescriptorFlavor::Native, Some(board)) => {
                doc.set_cache("BOARD", board, "Board to target")
            }
            (DescriptorFlavor::Native, None) => doc,
            (DescriptorFlavor::EspIdf, board) => {
                let doc = match board {
                    Some(board) => doc.set("IDF_TARGET", board),
                    None => doc,
                };
                doc.command("include", [format!("{}/tools/cmake/project.cmake", env("IDF_PATH"))])
            }
        }
    }

    fn descriptor(&self, unit: &UnitContext<'_>) -> String {
        let identity = DescriptorIdentity {
            project_name: unit.project_name(),
            main_name: unit.main_name().to_string(),
            main_target: self.main_target(unit),
            project_root: unit.project_root.to_string(),
            federate: unit.federate_name().map(str::to_string),
            log_level: unit.options.logging.value,
        };
        let options = DescriptorOptions {
            create_main_target: self.flavor == DescriptorFlavor::Native,
            install_target: self.install_target,
            kconfig_root: false,
            builder: match self.flavor {
                DescriptorFlavor::Native => "CMake",
                DescriptorFlavor::EspIdf => "ESP-IDF",
            },
        };
        build_descriptor(self.init_block(unit), &identity, &options).render()
    }

    fn make_script(&self, unit: &UnitContext<'_>) -> String {
        MakeScript {
            main_name: unit.main_name().to_string(),
            main_target: self.main_target(unit),
            platform: unit.platform,
            sizing: unit.sizing,
            federate: unit.federate_name().map(str::to_string),
            main_source: MAIN_SOURCE_PATH.to_string(),
        }
        .to_string()
    }
}

impl ArtifactGenerator for NativeBuildGenerator {
    fn name(&self) -> &str {
        match self.flavor {
            DescriptorFlavor::Native => "native-build",
            DescriptorFlavor::EspIdf => "esp-idf-build",
        }
    }

    fn generate(&self, unit: &UnitContext<'_>, out: &mut ArtifactSet) -> Result<()> {
        debug!(
            unit = %unit.project_name(),
            platform = %unit.platform,
            generator = self.name(),
            "generating native build files"
        );
        out.push(GeneratedArtifact::new("CMakeLists.txt", self.descriptor(unit)));
        out.push(GeneratedArtifact::new(MAKE_SCRIPT_PATH, self.make_script(unit)));

        let board = unit.boards.config_for(unit.selected_board());
        let composed = unit.composer.compose(&system_config(unit), board.as_ref());
        let file = unit.layout.generated_file();
        let overlay = unit.workspace.read(file);
        let merged = merge_with_workspace_overlay(&composed, overlay.as_deref(), file);
        out.push(GeneratedArtifact::new(file, merged.into_owned()));
        Ok(())
    }
}

/// Generated layer of the combined system configuration.
pub fn system_config(unit: &UnitContext<'_>) -> ConfigFragment {
    ConfigFragment::new()
        .comment(format!("System configuration for {}", unit.project_name()))
        .comment("This is a generated file, do not edit.")
        .heading("Runtime sizing")
        .raw("LF_EVENT_QUEUE_SIZE", unit.sizing.events.to_string())
        .raw("LF_REACTION_QUEUE_SIZE", unit.sizing.reactions.to_string())
        .raw("LF_LOG_LEVEL", format!("LF_LOG_LEVEL_{}", unit.options.logging.value.name()))
        .extend(platform_extras(unit.platform))
        .extend(network_section(unit))
}

fn platform_extras(platform: PlatformKind) -> ConfigFragment {
    match platform {
        PlatformKind::FreeRtos => ConfigFragment::new()
            .heading("FreeRTOS")
            .int("LF_MAIN_TASK_STACK_SIZE", i64::from(crate::main_gen::FREERTOS_MAIN_TASK_STACK)),
        PlatformKind::EspIdf => ConfigFragment::new()
            .heading("ESP-IDF")
            .int("ESP_MAIN_TASK_STACK_SIZE", 16384)
            .int("FREERTOS_HZ", 1000),
        _ => ConfigFragment::new(),
    }
}

fn network_section(unit: &UnitContext<'_>) -> ConfigFragment {
    let federate = unit.federate_name().unwrap_or_default();
    match unit.network {
        UnitNetwork::None => ConfigFragment::new(),
        UnitNetwork::Loopback => ConfigFragment::new()
            .heading("Federated networking")
            .string("LF_FEDERATE", federate)
            .flag("NET_IPV4", true)
            .string("NET_CONFIG_MY_IPV4_ADDR", LOOPBACK_IPV4),
        UnitNetwork::Ipv6(address) => ConfigFragment::new()
            .heading("Federated networking (6LoWPAN)")
            .string("LF_FEDERATE", federate)
            .flag("NET_IPV6", true)
            .flag("NET_IPV4", false)
            .string("NET_CONFIG_MY_IPV6_ADDR", address.to_string())
            .int("NET_BUF_RX_COUNT", IPV6_NET_BUF_COUNT)
            .int("NET_BUF_TX_COUNT", IPV6_NET_BUF_COUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::testing::{Fixture, NO_WORKSPACE};
    use crate::generator::SystemConfigLayout;
    use crate::workspace::MemoryWorkspace;
    use ucgen_targets::{FederateDescriptor, LogLevel, TargetOptions};

    const LF_CONF: SystemConfigLayout = SystemConfigLayout::Combined { file: "lf.conf" };

    fn run(unit: &UnitContext<'_>, generator: NativeBuildGenerator) -> ArtifactSet {
        let mut out = ArtifactSet::new();
        generator.generate(unit, &mut out).unwrap();
        out
    }

    #[test]
    fn standalone_native_descriptor() {
        let fixture = Fixture::new(TargetOptions::default());
        let unit = fixture.unit(None, UnitNetwork::None, LF_CONF, &NO_WORKSPACE);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::Native));
        let cmake = &out.get("CMakeLists.txt").unwrap().content;
        assert!(cmake.contains("set(PLATFORM \"POSIX\" CACHE STRING \"Platform to target\")"));
        assert!(!cmake.contains("BOARD"));
        assert!(cmake.contains("project(Main)\n"));
        assert!(cmake.contains("set(LF_MAIN_TARGET App)\n"));
        assert!(cmake.contains("add_executable(${LF_MAIN_TARGET})"));
        assert!(cmake.contains("install(TARGETS"));
        assert!(!cmake.contains("FEDERATE"));

        let make = &out.get(MAKE_SCRIPT_PATH).unwrap().content;
        assert!(make.contains("EVENT_QUEUE_SIZE = 8\nREACTION_QUEUE_SIZE = 12\n"));

        let conf = &out.get("lf.conf").unwrap().content;
        assert!(conf.contains("CONFIG_LF_EVENT_QUEUE_SIZE=8\n"));
        assert!(conf.contains("CONFIG_LF_LOG_LEVEL=LF_LOG_LEVEL_INFO\n"));
        assert!(!conf.contains("Federated networking"));
    }

    #[test]
    fn federated_tcp_uses_loopback() {
        let fixture = Fixture::new(TargetOptions::default().with_logging(LogLevel::Debug));
        let fed = FederateDescriptor::new("f0", 0);
        let unit = fixture.unit(Some(&fed), UnitNetwork::Loopback, LF_CONF, &NO_WORKSPACE);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::Native));
        let cmake = &out.get("CMakeLists.txt").unwrap().content;
        assert!(cmake.contains("set(FEDERATE f0)"));
        assert!(cmake.contains("set(LF_MAIN_TARGET App_f0)"));
        assert!(cmake.contains("set(LOG_LEVEL LF_LOG_LEVEL_DEBUG)"));
        let conf = &out.get("lf.conf").unwrap().content;
        assert!(conf.contains("CONFIG_NET_CONFIG_MY_IPV4_ADDR=\"127.0.0.1\"\n"));
        assert!(!conf.contains("IPV6"));
    }

    #[test]
    fn federated_ipv6_section() {
        let fixture = Fixture::new(TargetOptions::default());
        let fed = FederateDescriptor::new("f1", 1);
        let address = "fd01::2".parse().unwrap();
        let unit = fixture.unit(Some(&fed), UnitNetwork::Ipv6(address), LF_CONF, &NO_WORKSPACE);
        let conf = system_config(&unit).render();
        assert!(conf.contains(
            "CONFIG_NET_IPV6=y\nCONFIG_NET_IPV4=n\nCONFIG_NET_CONFIG_MY_IPV6_ADDR=\"fd01::2\"\n"
        ));
        assert!(conf.contains("CONFIG_NET_BUF_TX_COUNT=16\n"));
    }

    #[test]
    fn board_fragment_follows_generated() {
        let fixture = Fixture::new(TargetOptions::default().with_board("w5500_evb_pico"));
        let unit = fixture.unit(None, UnitNetwork::None, LF_CONF, &NO_WORKSPACE);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::Native));
        let conf = &out.get("lf.conf").unwrap().content;
        let base = conf.find("CONFIG_LF_LOG_LEVEL").unwrap();
        let pico = conf.find("CONFIG_ENTROPY_GENERATOR=y").unwrap();
        assert!(base < pico);
        let cmake = &out.get("CMakeLists.txt").unwrap().content;
        assert!(cmake.contains("set(BOARD \"w5500_evb_pico\" CACHE STRING \"Board to target\")"));
    }

    #[test]
    fn combined_config_merges_workspace_overlay() {
        let fixture = Fixture::new(TargetOptions::default());
        let workspace = MemoryWorkspace::new().with_file("lf.conf", "CONFIG_USER=1\n");
        let unit = fixture.unit(None, UnitNetwork::None, LF_CONF, &workspace);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::Native));
        let conf = &out.get("lf.conf").unwrap().content;
        let marker = conf.find("# ---- User-provided lf.conf overlay ----").unwrap();
        assert!(conf[marker..].ends_with("CONFIG_USER=1\n"));
    }

    #[test]
    fn freertos_and_esp_idf_extras() {
        let fixture = Fixture::new(TargetOptions::for_platform(PlatformKind::FreeRtos));
        let unit = fixture.unit(None, UnitNetwork::None, LF_CONF, &NO_WORKSPACE);
        let conf = system_config(&unit).render();
        assert!(conf.contains("CONFIG_LF_MAIN_TASK_STACK_SIZE=4096\n"));

        let options = TargetOptions::for_platform(PlatformKind::EspIdf).with_board("esp32s3");
        let fixture = Fixture::new(options);
        let layout = SystemConfigLayout::Combined { file: "sdkconfig.defaults" };
        let unit = fixture.unit(None, UnitNetwork::None, layout, &NO_WORKSPACE);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::EspIdf));
        let conf = &out.get("sdkconfig.defaults").unwrap().content;
        assert!(conf.contains("CONFIG_ESP_MAIN_TASK_STACK_SIZE=16384\nCONFIG_FREERTOS_HZ=1000\n"));
        let cmake = &out.get("CMakeLists.txt").unwrap().content;
        assert!(cmake.contains(
            "set(IDF_TARGET esp32s3)\n\
             include($ENV{IDF_PATH}/tools/cmake/project.cmake)\nproject(Main)"
        ));
        assert!(cmake.contains("set(LF_MAIN_TARGET Main.elf)"));
        assert!(!cmake.contains("add_executable"));
        assert!(cmake.contains("was not created by ESP-IDF"));
    }

    #[test]
    fn only_native_flavour_installs_its_target() {
        let fixture = Fixture::new(TargetOptions::for_platform(PlatformKind::EspIdf));
        let layout = SystemConfigLayout::Combined { file: "sdkconfig.defaults" };
        let unit = fixture.unit(None, UnitNetwork::None, layout, &NO_WORKSPACE);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::EspIdf));
        assert!(!out.get("CMakeLists.txt").unwrap().content.contains("install("));

        let fixture = Fixture::new(TargetOptions::default());
        let unit = fixture.unit(None, UnitNetwork::None, LF_CONF, &NO_WORKSPACE);
        let out = run(&unit, NativeBuildGenerator::new(DescriptorFlavor::Native));
        let cmake = &out.get("CMakeLists.txt").unwrap().content;
        assert!(cmake.contains("install(TARGETS ${LF_MAIN_TARGET} DESTINATION"));
    }
}
