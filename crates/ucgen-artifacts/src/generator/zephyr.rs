//! Zephyr build scaffolding, replacing the native build files entirely.
//!
//! Emits a `CMakeLists.txt` driving the Zephyr build system, the generated
//! `prj_lf.conf` (standalone, TCP/IPv4 federate or 6LoWPAN federate base,
//! followed by any board fragment), a `Kconfig` exposing the network worker
//! options merged with the workspace `Kconfig`, and pass-through copies of
//! the workspace `prj.conf` and `app.overlay`.

use tracing::debug;

use super::{ArtifactGenerator, UnitContext, UnitNetwork, LOOPBACK_IPV4};
use crate::artifact::{ArtifactSet, GeneratedArtifact};
use crate::cmake::{
    build_descriptor, env, quoted, var, CmakeDocument, DescriptorIdentity, DescriptorOptions,
};
use crate::compose::merge_with_workspace_overlay;
use crate::config::ConfigFragment;
use crate::error::Result;
use crate::kconfig::KconfigDocument;
use ucgen_targets::LogLevel;

/// Board used when neither the user nor the federate picked one.
pub const DEFAULT_BOARD: &str = "nrf52840dk_nrf52840";

/// Workspace files copied into the project unchanged.
pub const PASS_THROUGH_FILES: [&str; 2] = ["prj.conf", "app.overlay"];

const KCONFIG_FILE: &str = "Kconfig";

const HINTS_VAR: &str = "_LF_ZEPHYR_HINTS";

/// Connection budget of a 6LoWPAN federate.
const MAX_NET_CONNECTIONS: i64 = 10;

/// Zephyr's numeric `LOG_DEFAULT_LEVEL` for a runtime log level.
pub fn zephyr_log_level(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 1,
        LogLevel::Warn => 2,
        LogLevel::Info | LogLevel::Log => 3,
        LogLevel::Debug => 4,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZephyrGenerator;

impl ZephyrGenerator {
    /// Board written as the CMake default.
    ///
    /// The selected board only becomes the default when the federate named
    /// it or the user set it explicitly; a computed board is ignored.
    pub fn default_board<'a>(unit: &UnitContext<'a>) -> &'a str {
        let explicit = unit.federate_board().is_some() || unit.options.board.user_set;
        match unit.selected_board() {
            Some(board) if explicit => board,
            _ => DEFAULT_BOARD,
        }
    }

    fn init_block(unit: &UnitContext<'_>) -> CmakeDocument {
        let conf_file = unit.layout.generated_file();
        let mut doc = CmakeDocument::new()
            .set_cache("PLATFORM", "ZEPHYR", "Platform to target")
            .if_then(
                "NOT DEFINED BOARD",
                CmakeDocument::new().set("BOARD", quoted(Self::default_board(unit))),
            )
            .comment("Include default lf conf-file.")
            .set("CONF_FILE", conf_file);
        if let Some(user_override) = unit.layout.user_override() {
            doc = doc.comment("Include user-provided conf-file, if it exists").if_then(
                format!("EXISTS {user_override}"),
                CmakeDocument::new().set("OVERLAY_CONFIG", user_override),
            );
        }
        let zephyr_base = env("ZEPHYR_BASE");
        let vendored = format!("{}/deps/zephyr", var("CMAKE_CURRENT_SOURCE_DIR"));
        let append_hint = |hint: String| {
            CmakeDocument::new().command("list", ["APPEND", HINTS_VAR, hint.as_str()])
        };
        let hints = var(HINTS_VAR);
        let with_hints = CmakeDocument::new()
            .command("find_package", ["Zephyr", "REQUIRED", "HINTS", hints.as_str()]);
        doc.command("set", [HINTS_VAR])
            .if_then(
                format!("DEFINED ENV{{ZEPHYR_BASE}} AND EXISTS {}", quoted(&zephyr_base)),
                append_hint(quoted(&zephyr_base)),
            )
            .if_then(
                format!("EXISTS {}", quoted(&vendored)),
                append_hint(quoted(&vendored)),
            )
            .if_else(
                HINTS_VAR,
                with_hints,
                CmakeDocument::new().command("find_package", ["Zephyr", "REQUIRED"]),
            )
            .command(
                "zephyr_compile_options",
                ["-Wno-error=unused-parameter", "-Wno-error=type-limits"],
            )
            .command("zephyr_compile_definitions", ["_GNU_SOURCE"])
    }

    fn descriptor(unit: &UnitContext<'_>) -> String {
        let identity = DescriptorIdentity {
            project_name: unit.project_name(),
            main_name: unit.main_name().to_string(),
            main_target: "app".to_string(),
            project_root: unit.project_root.to_string(),
            federate: unit.federate_name().map(str::to_string),
            log_level: unit.options.logging.value,
        };
        let options = DescriptorOptions {
            create_main_target: false,
            install_target: false,
            kconfig_root: true,
            builder: "Zephyr",
        };
        build_descriptor(Self::init_block(unit), &identity, &options).render()
    }

    /// Generated base configuration of `prj_lf.conf`, without the board fragment.
    pub fn base_config(unit: &UnitContext<'_>) -> ConfigFragment {
        match unit.network {
            UnitNetwork::None => standalone_base(),
            UnitNetwork::Loopback => tcp_federate_base(),
            UnitNetwork::Ipv6(address) => {
                sicslowpan_federate_base(&address.to_string(), unit.options.logging.value)
            }
        }
    }
}

impl ArtifactGenerator for ZephyrGenerator {
    fn name(&self) -> &str {
        "zephyr"
    }

    fn generate(&self, unit: &UnitContext<'_>, out: &mut ArtifactSet) -> Result<()> {
        debug!(
            unit = %unit.project_name(),
            board = Self::default_board(unit),
            "generating zephyr artifacts"
        );
        out.push(GeneratedArtifact::new("CMakeLists.txt", Self::descriptor(unit)));

        let board = unit.boards.config_for(unit.selected_board());
        let prj = unit.composer.compose(&Self::base_config(unit), board.as_ref());
        out.push(GeneratedArtifact::new(unit.layout.generated_file(), prj));

        let kconfig = KconfigDocument::network_worker().render();
        let workspace_kconfig = unit.workspace.read(KCONFIG_FILE);
        let merged =
            merge_with_workspace_overlay(&kconfig, workspace_kconfig.as_deref(), KCONFIG_FILE);
        out.push(GeneratedArtifact::new(KCONFIG_FILE, merged.into_owned()));

        for file in PASS_THROUGH_FILES {
            match unit.workspace.read(file) {
                Some(content) => out.push(GeneratedArtifact::new(file, content)),
                None => debug!(file, "workspace file absent, not copied"),
            }
        }
        Ok(())
    }
}

/// Networking and POSIX shared by the standalone and TCP bases.
fn posix_networking() -> ConfigFragment {
    ConfigFragment::new()
        .flag("ETH_NATIVE_POSIX", false)
        .flag("NET_DRIVERS", true)
        .flag("NETWORKING", true)
        .flag("NET_TCP", true)
}

fn worker_defaults(fragment: ConfigFragment) -> ConfigFragment {
    fragment
        .int("MAIN_STACK_SIZE", 16384)
        .int("HEAP_MEM_POOL_SIZE", 1024)
        .int("LF_TCP_IP_CHANNEL_STACK_SIZE", 4096)
        .int("LF_TCP_IP_CHANNEL_THREAD_PREEMPT_LEVEL", 0)
        .string("LF_TCP_IP_CHANNEL_THREAD_NAME", "lf_tcpip_rx")
}

fn standalone_base() -> ConfigFragment {
    let fragment = posix_networking()
        .flag("NET_UDP", true)
        .flag("NET_IPV4", true)
        .flag("NET_SOCKETS", true)
        .flag("POSIX_API", true);
    worker_defaults(fragment)
}

fn tcp_federate_base() -> ConfigFragment {
    let fragment = posix_networking()
        .flag("NET_IPV4", true)
        .flag("NET_SOCKETS", true)
        .flag("POSIX_API", true);
    worker_defaults(fragment)
        .blank()
        .comment("Network address config")
        .flag("NET_CONFIG_SETTINGS", true)
        .flag("NET_CONFIG_NEED_IPV4", true)
        .string("NET_CONFIG_MY_IPV4_ADDR", LOOPBACK_IPV4)
        .flag("NET_SOCKETS_OFFLOAD", true)
        .flag("NET_NATIVE_OFFLOADED_SOCKETS", true)
}

fn sicslowpan_federate_base(address: &str, logging: LogLevel) -> ConfigFragment {
    ConfigFragment::new()
        .comment("Lingua Franca Zephyr configuration file")
        .comment("This is a generated file, do not edit.")
        .blank()
        .flag("PRINTK", true)
        .flag("USE_SEGGER_RTT", true)
        .flag("LOG_BACKEND_RTT", true)
        .flag("DEBUG_INFO", true)
        .flag("RTT_CONSOLE", true)
        .flag("UART_CONSOLE", false)
        .flag("LOG_MODE_IMMEDIATE", true)
        .flag("LOG", true)
        .heading("Diagnostics and logging")
        .int("LOG_DEFAULT_LEVEL", i64::from(zephyr_log_level(logging)))
        .flag("LOG_PROCESS_THREAD", false)
        .heading("POSIX sockets and networking")
        .flag("NETWORKING", true)
        .flag("NET_IPV6", true)
        .flag("NET_TCP", true)
        .flag("NET_SOCKETS", true)
        .flag("NET_CONNECTION_MANAGER", true)
        .flag("POSIX_API", true)
        .heading("Network buffers")
        .int("NET_PKT_RX_COUNT", 8)
        .int("NET_PKT_TX_COUNT", 8)
        .int("NET_BUF_RX_COUNT", 16)
        .int("NET_BUF_TX_COUNT", 16)
        .flag("NET_CONTEXT_NET_PKT_POOL", false)
        .heading("IP address options")
        .int("NET_IF_UNICAST_IPV6_ADDR_COUNT", 3)
        .int("NET_IF_MCAST_IPV6_ADDR_COUNT", 4)
        .int("NET_MAX_CONTEXTS", 6)
        .int("NET_MAX_CONN", MAX_NET_CONNECTIONS)
        .heading("Network shell")
        .flag("NET_SHELL", false)
        .flag("SHELL", false)
        .heading("Network application options and configs")
        .flag("NET_CONFIG_SETTINGS", true)
        .flag("NET_CONFIG_NEED_IPV4", false)
        .flag("NET_CONFIG_NEED_IPV6", true)
        .string("NET_CONFIG_MY_IPV6_ADDR", address)
        .int("ZVFS_OPEN_MAX", 16)
        .int("NET_IF_MAX_IPV6_COUNT", 2)
        .heading("IEEE802.15.4 6LoWPAN")
        .flag("BT", false)
        .flag("NET_UDP", true)
        .flag("NET_IPV4", false)
        .int("NET_L2_IEEE802154_FRAGMENT_REASS_CACHE_SIZE", 8)
        .flag("NET_L2_IEEE802154_RADIO_CSMA_CA", true)
        .flag("NET_L2_IEEE802154_RADIO_ALOHA", false)
        .string("NET_CONFIG_MY_IPV4_ADDR", "")
        .string("NET_CONFIG_PEER_IPV4_ADDR", "")
        .flag("NET_L2_IEEE802154", true)
        .flag("NET_L2_IEEE802154_SHELL", false)
        .flag("NET_IPV6_ND", false)
        .flag("NET_IPV6_NBR_CACHE", false)
        .int("NET_CONFIG_IEEE802154_CHANNEL", 26)
        .heading("Additional system configuration")
        .int("SYSTEM_WORKQUEUE_STACK_SIZE", 2048)
        .int("MAIN_STACK_SIZE", 4096)
        .int("LF_TCP_IP_CHANNEL_STACK_SIZE", 2048)
        .int("HEAP_MEM_POOL_SIZE", 1024)
        .flag("THREAD_CUSTOM_DATA", true)
        .comment("Enable floating point formatting/logging support.")
        .comment("This increases code size, so feel free to disable if not needed.")
        .flag("CBPRINTF_FP_SUPPORT", true)
}
