//! Generation report listing every deployment unit and artifact.

use std::fmt;

use serde::Serialize;

use crate::driver::GenerationOutput;

/// One artifact with its content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
    pub executable: bool,
}

/// One deployment unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federate: Option<String>,
    pub directory: String,
    pub platform: String,
    pub native_build_files: bool,
    pub clean_build_directory: bool,
    pub install_target: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub artifacts: Vec<String>,
}

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub project: String,
    pub federated: bool,
    pub units: Vec<UnitReport>,
    /// Every artifact, in generation order.
    pub artifacts: Vec<ArtifactEntry>,
}

impl GenerationReport {
    pub fn from_output(project: &str, output: &GenerationOutput) -> Self {
        let units = output
            .units
            .iter()
            .map(|unit| UnitReport {
                federate: unit.federate.clone(),
                directory: unit.directory.clone(),
                platform: unit.platform.name().to_string(),
                native_build_files: unit.plan.native_build_files,
                clean_build_directory: unit.plan.clean_build_directory,
                install_target: unit.plan.install_target,
                address: unit.address.map(|a| a.to_string()),
                artifacts: unit.artifacts.clone(),
            })
            .collect();
        let artifacts = output
            .artifacts
            .iter()
            .map(|a| ArtifactEntry {
                path: a.path.clone(),
                bytes: a.content.len(),
                sha256: a.sha256(),
                executable: a.executable,
            })
            .collect();
        Self {
            project: project.to_string(),
            federated: output.units.iter().any(|u| u.federate.is_some()),
            units,
            artifacts,
        }
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Generation Report ===")?;
        writeln!(f, "Project: {}", self.project)?;
        writeln!(
            f,
            "Mode: {}",
            if self.federated { "federated" } else { "standalone" }
        )?;

        for unit in &self.units {
            writeln!(f)?;
            match &unit.federate {
                Some(name) => writeln!(f, "--- Federate {name} ({}) ---", unit.platform)?,
                None => writeln!(f, "--- Application ({}) ---", unit.platform)?,
            }
            writeln!(f, "  Directory: {}", unit.directory)?;
            if let Some(address) = &unit.address {
                writeln!(f, "  Address: {address}")?;
            }
            writeln!(
                f,
                "  Native build files: {}, clean build dir: {}, install target: {}",
                yes_no(unit.native_build_files),
                yes_no(unit.clean_build_directory),
                yes_no(unit.install_target),
            )?;
        }

        writeln!(f)?;
        writeln!(f, "--- Artifacts ({}) ---", self.artifacts.len())?;
        for artifact in &self.artifacts {
            writeln!(
                f,
                "  {}  {:>6} B  {}{}",
                &artifact.sha256[..12.min(artifact.sha256.len())],
                artifact.bytes,
                artifact.path,
                if artifact.executable { " (executable)" } else { "" },
            )?;
        }
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{GenerationRequest, PlatformDriver};
    use crate::workspace::NoWorkspace;
    use std::path::Path;
    use ucgen_targets::{FederateDescriptor, PlatformKind, ProjectManifest, TargetOptions};

    fn output(manifest: &ProjectManifest) -> GenerationOutput {
        let request = GenerationRequest {
            manifest,
            workspace: &NoWorkspace,
            output_root: Path::new("/out"),
        };
        PlatformDriver::new().generate(&request).unwrap()
    }

    #[test]
    fn standalone_report() {
        let manifest = ProjectManifest::standalone("Blink");
        let report = GenerationReport::from_output("Blink", &output(&manifest));
        assert!(!report.federated);
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].platform, "native");
        assert!(report.artifacts.iter().all(|a| a.sha256.len() == 64));

        let text = report.to_string();
        assert!(text.contains("=== Generation Report ==="));
        assert!(text.contains("--- Application (native) ---"));
        assert!(text.contains("Blink/CMakeLists.txt"));
    }

    #[test]
    fn federated_report_serializes() {
        let mut manifest = ProjectManifest::standalone("Fed");
        manifest.target = TargetOptions::for_platform(PlatformKind::Native);
        manifest.federates = vec![FederateDescriptor::new("a", 0)];
        let report = GenerationReport::from_output("Fed", &output(&manifest));
        assert!(report.federated);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["units"][0]["federate"], "a");
        assert!(json["units"][0].get("address").is_none());
        let script = report.artifacts.iter().find(|a| a.path == "Fed/bin/Fed").unwrap();
        assert!(script.executable);
        assert!(report.to_string().contains("Fed/bin/Fed (executable)"));
    }

    #[test]
    fn identical_inputs_produce_identical_digests() {
        let manifest = ProjectManifest::standalone("Blink");
        let a = GenerationReport::from_output("Blink", &output(&manifest));
        let b = GenerationReport::from_output("Blink", &output(&manifest));
        assert_eq!(a, b);
    }
}
