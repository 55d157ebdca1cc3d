//! TOML parsing, serialization and validation for project manifests.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv6Addr;
use std::path::Path;

use crate::error::{Result, TargetError};
use crate::manifest::ProjectManifest;
use crate::platform::PlatformKind;

/// A validation issue found in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// The `[[federates]]` entry concerned, when the issue is about one.
    pub federate: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: "error",
            federate: None,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: "warning",
            federate: None,
            message: message.into(),
        }
    }

    fn on(mut self, federate: &str) -> Self {
        self.federate = Some(federate.to_string());
        self
    }

    /// Whether this issue blocks generation.
    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.federate {
            Some(federate) => write!(f, "federate '{federate}': {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Load a manifest from a `ucgen.toml` file.
pub fn load_manifest_toml(path: &Path) -> Result<ProjectManifest> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| TargetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest_toml(&content)
}

/// Parse a manifest from a TOML string. Missing federate ordinals are filled in.
pub fn parse_manifest_toml(toml_str: &str) -> Result<ProjectManifest> {
    let mut manifest: ProjectManifest = toml::from_str(toml_str)?;
    if manifest.project.name.trim().is_empty() {
        return Err(TargetError::EmptyProjectName);
    }
    manifest.assign_ordinals();
    Ok(manifest)
}

/// Serialize a manifest to pretty TOML. Computed defaults are omitted.
pub fn manifest_to_toml(manifest: &ProjectManifest) -> Result<String> {
    let toml_str = toml::to_string_pretty(manifest)?;
    Ok(toml_str)
}

/// Validate a manifest for consistency.
///
/// Returns `Ok(())` if there is nothing to report, or `Err(issues)`. Only
/// issues with severity "error" should block generation.
pub fn validate_manifest(
    manifest: &ProjectManifest,
) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let target = &manifest.target;

    // 1. net-interface only makes sense for federations
    if target.net_interface.user_set && !manifest.is_federated() {
        issues.push(ValidationIssue::error(
            "the net-interface target option requires a federated program",
        ));
    }

    // 2. Federate names are present, unique and usable as a directory name
    let mut seen = BTreeSet::new();
    for federate in &manifest.federates {
        let name = federate.name.as_str();
        if name.trim().is_empty() {
            issues.push(ValidationIssue::error("federate with an empty name"));
        } else if !is_single_path_component(name) {
            issues.push(ValidationIssue::error("not a single path component").on(name));
        } else if !seen.insert(name) {
            issues.push(ValidationIssue::error(format!(
                "duplicate federate name '{name}'"
            )));
        }
    }

    let constrained = target.net_interface.value.is_constrained();
    let mut declared: BTreeMap<Ipv6Addr, &str> = BTreeMap::new();
    for federate in &manifest.federates {
        // 3. 6LoWPAN is only supported on Zephyr
        let platform = federate.resolve_platform(target);
        if constrained && platform != PlatformKind::Zephyr {
            issues.push(
                ValidationIssue::warning(format!(
                    "the sicslowpan network interface requires the zephyr platform \
                     (resolved to {platform})"
                ))
                .on(&federate.name),
            );
        }

        // 4. Explicit 6LoWPAN bindings must carry IPv6 addresses
        for binding in &federate.interfaces {
            if binding.transport.is_constrained() && binding.ipv6().is_none() {
                issues.push(
                    ValidationIssue::warning(format!(
                        "sicslowpan interface address '{}' is not a valid IPv6 address",
                        binding.address
                    ))
                    .on(&federate.name),
                );
            }
        }

        // 5. No two federates declare the same IPv6 address
        if let Some(address) = federate.explicit_ipv6() {
            if let Some(first) = declared.insert(address, federate.name.as_str()) {
                issues.push(ValidationIssue::error(format!(
                    "federates '{first}' and '{}' both declare address {address}",
                    federate.name
                )));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Validate a manifest and return its warnings.
///
/// Fails with [`TargetError::Invalid`], carrying every issue found, when any
/// of them is an error.
pub fn check_manifest(manifest: &ProjectManifest) -> Result<Vec<ValidationIssue>> {
    match validate_manifest(manifest) {
        Ok(()) => Ok(Vec::new()),
        Err(issues) if issues.iter().any(ValidationIssue::is_error) => {
            Err(TargetError::Invalid {
                project: manifest.project.name.clone(),
                issues,
            })
        }
        Err(warnings) => Ok(warnings),
    }
}

/// Federate names become output directories below the application directory.
fn is_single_path_component(name: &str) -> bool {
    !name.contains(|c: char| c == '/' || c == '\\') && name != "." && name != ".."
}
