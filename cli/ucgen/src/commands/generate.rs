//! `ucgen generate`: compose and write every platform artifact.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use ucgen_artifacts::{FsWorkspace, GenerationReport, GenerationRequest, PlatformDriver};
use ucgen_targets::ProjectManifest;

use super::check::validated;

/// Output directory, relative to the project, when `--out` is not given.
pub const DEFAULT_OUT_DIR: &str = "out";

/// Report format of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

/// Options of one `generate` invocation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions<'a> {
    /// Output directory; relative paths are taken from the project directory.
    pub out: Option<&'a Path>,
    /// Directory probed for user overlays; the project directory by default.
    pub workspace: Option<&'a Path>,
}

/// Generate the project and return the report of what was written.
pub fn generate(
    project_dir: &Path,
    manifest: &ProjectManifest,
    options: &GenerateOptions<'_>,
) -> Result<GenerationReport> {
    validated(manifest).context("nothing generated")?;

    let out_dir = project_dir.join(options.out.unwrap_or(Path::new(DEFAULT_OUT_DIR)));
    let workspace = FsWorkspace::new(project_dir.join(options.workspace.unwrap_or(Path::new("."))));
    let request = GenerationRequest {
        manifest,
        workspace: &workspace,
        output_root: &out_dir,
    };
    let output = PlatformDriver::new()
        .generate(&request)
        .with_context(|| format!("generating '{}'", manifest.project.name))?;
    let written = output
        .write_all(&out_dir)
        .with_context(|| format!("writing artifacts below {}", out_dir.display()))?;
    info!(files = written.len(), out = %out_dir.display(), "wrote artifacts");

    Ok(GenerationReport::from_output(&manifest.project.name, &output))
}

/// Run `generate` and print the report.
pub fn run(
    project_dir: &Path,
    manifest: &ProjectManifest,
    options: &GenerateOptions<'_>,
    format: ReportFormat,
) -> Result<()> {
    let report = generate(project_dir, manifest, options)?;
    match format {
        ReportFormat::Human => print!("{report}"),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("serializing report")?;
            println!("{json}");
        }
    }
    Ok(())
}
