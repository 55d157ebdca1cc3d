//! `ucgen clean`: remove generated artifacts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Remove the output directory (`out/` unless overridden) of the project.
pub fn run(project_dir: &Path, out: Option<&Path>) -> Result<()> {
    let out_dir = project_dir.join(out.unwrap_or(Path::new(super::generate::DEFAULT_OUT_DIR)));
    if out_dir.exists() {
        fs::remove_dir_all(&out_dir)
            .with_context(|| format!("removing {}", out_dir.display()))?;
        println!("Removed {}", out_dir.display());
    } else {
        println!("Already clean: {} does not exist", out_dir.display());
    }
    Ok(())
}
