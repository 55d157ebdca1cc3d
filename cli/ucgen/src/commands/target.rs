//! `ucgen target`: platform listing and description.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use ucgen_artifacts::{BoardQuirkTable, PlatformRegistry};
use ucgen_targets::PlatformKind;

/// One-line description of a built-in platform.
fn description(platform: PlatformKind) -> &'static str {
    match platform {
        PlatformKind::Native => "Native POSIX host (CMake)",
        PlatformKind::FreeRtos => "FreeRTOS task entry on the common CMake path",
        PlatformKind::EspIdf => "Espressif ESP-IDF project",
        PlatformKind::Zephyr => "Zephyr RTOS (west/CMake, prj.conf, Kconfig)",
        PlatformKind::Rp2040 => "Raspberry Pi RP2040 SDK on the common CMake path",
        PlatformKind::Riot => "RIOT OS on the common CMake path",
        PlatformKind::Auto => "Resolved to the application-wide platform",
    }
}

/// Structural summary of a platform's generator set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSummary {
    pub name: &'static str,
    pub description: &'static str,
    pub build_system_name: &'static str,
    pub registered: bool,
    pub generators: Vec<String>,
    pub system_config: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_override: Option<&'static str>,
    pub native_build_files: bool,
    pub clean_build_directory: bool,
    pub install_target: bool,
}

impl PlatformSummary {
    pub fn for_platform(registry: &PlatformRegistry, platform: PlatformKind) -> Self {
        let set = registry.generators_for(platform);
        Self {
            name: set.platform.name(),
            description: description(set.platform),
            build_system_name: set.platform.build_system_name(),
            registered: registry.is_registered(set.platform),
            generators: set.generators().iter().map(|g| g.name().to_string()).collect(),
            system_config: set.layout.generated_file(),
            user_override: set.layout.user_override(),
            native_build_files: set.plan.native_build_files,
            clean_build_directory: set.plan.clean_build_directory,
            install_target: set.plan.install_target,
        }
    }
}

/// List all built-in platforms and boards with quirks.
pub fn list() -> Result<()> {
    println!("Built-in platforms:");
    println!();
    for platform in PlatformKind::CONCRETE {
        println!("  {:<12} {}", platform.name(), description(platform));
    }
    println!();
    println!("Boards with extra configuration:");
    for board in BoardQuirkTable::builtin().known_boards() {
        println!("  {board}");
    }
    println!();
    println!("Use 'ucgen target describe <name>' for details.");
    Ok(())
}

/// Describe a specific platform. `format` is "toml", "json" or human-readable.
pub fn describe(name: &str, format: Option<&str>) -> Result<()> {
    let Some(platform) = PlatformKind::parse(name) else {
        bail!("unknown platform: '{name}'. Use 'ucgen target list' to see available platforms.");
    };
    let summary = PlatformSummary::for_platform(&PlatformRegistry::builtin(), platform);
    match format {
        Some("toml") => {
            let text = toml::to_string_pretty(&summary).context("serializing summary")?;
            print!("{text}");
        }
        Some("json") => {
            let text = serde_json::to_string_pretty(&summary).context("serializing summary")?;
            println!("{text}");
        }
        Some(other) => bail!("unknown format '{other}' (expected toml or json)"),
        None => print_human(&summary),
    }
    Ok(())
}

fn print_human(summary: &PlatformSummary) {
    println!("=== Platform: {} ===", summary.name);
    println!("{}", summary.description);
    println!();
    println!("  PLATFORM:            {}", summary.build_system_name);
    println!("  Generators:          {}", summary.generators.join(", "));
    println!("  System config:       {}", summary.system_config);
    if let Some(user_override) = summary.user_override {
        println!("  User override:       {user_override}");
    }
    println!("  Native build files:  {}", summary.native_build_files);
    println!("  Clean build dir:     {}", summary.clean_build_directory);
    println!("  Install target:      {}", summary.install_target);
    if !summary.registered {
        println!("  (common native path)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_known_platforms() {
        for platform in PlatformKind::CONCRETE {
            assert!(describe(platform.name(), None).is_ok());
        }
        assert!(describe("zephyr", Some("toml")).is_ok());
        assert!(describe("zephyr", Some("json")).is_ok());
    }

    #[test]
    fn describe_unknown_platform() {
        assert!(describe("vxworks", None).is_err());
        assert!(describe("native", Some("yaml")).is_err());
    }

    fn summary(platform: PlatformKind) -> PlatformSummary {
        PlatformSummary::for_platform(&PlatformRegistry::builtin(), platform)
    }

    #[test]
    fn zephyr_summary() {
        let summary = summary(PlatformKind::Zephyr);
        assert_eq!(summary.generators, ["main", "zephyr"]);
        assert_eq!(summary.system_config, "prj_lf.conf");
        assert_eq!(summary.user_override, Some("prj.conf"));
        assert!(!summary.native_build_files);
        assert!(!summary.install_target);
        let text = toml::to_string_pretty(&summary).unwrap();
        assert!(text.contains("system-config = \"prj_lf.conf\""));
    }

    #[test]
    fn auto_summarises_fallback() {
        let summary = summary(PlatformKind::Auto);
        assert_eq!(summary.name, "native");
        assert!(!summary.registered);
    }
}
