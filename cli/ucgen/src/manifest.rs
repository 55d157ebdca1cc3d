//! `ucgen.toml` discovery and command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ucgen_targets::{load_manifest_toml, PlatformKind, ProjectManifest, Tracked};

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "ucgen.toml";

/// Search upward from `start_dir` for a `ucgen.toml` file, parse and return it
/// along with the directory it was found in.
pub fn find_and_load(start_dir: &Path) -> Result<Option<(ProjectManifest, PathBuf)>> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            let manifest = load_manifest_toml(&candidate)
                .with_context(|| format!("loading {}", candidate.display()))?;
            tracing::debug!(path = %candidate.display(), "found project manifest");
            return Ok(Some((manifest, dir)));
        }
        if !dir.pop() {
            break;
        }
    }
    Ok(None)
}

/// Generate the default manifest for `ucgen init`.
pub fn template(name: &str) -> String {
    format!(
        r#"[project]
name = "{name}"

[target]
platform = "native"
logging = "info"
# Federations only: "tcp" (default) or "sicslowpan".
# net-interface = "sicslowpan"

[sizing]
events = 8
reactions = 8

# Declare federates to generate a federation instead of a single application.
# [[federates]]
# name = "sender"
# platform = "zephyr"
#
# [[federates]]
# name = "receiver"
# board = "rpi_pico"
"#
    )
}

/// Target options given on the command line. Both take precedence over the
/// manifest and count as set by the user.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub platform: Option<PlatformKind>,
    pub board: Option<String>,
}

impl Overrides {
    pub fn apply(&self, manifest: &mut ProjectManifest) {
        if let Some(platform) = self.platform {
            manifest.target.platform = Tracked::user(platform);
        }
        if let Some(board) = &self.board {
            manifest.target.board = Tracked::user(Some(board.clone()));
        }
    }
}

/// Clap value parser for platform names.
pub fn parse_platform(s: &str) -> std::result::Result<PlatformKind, String> {
    PlatformKind::parse(s).ok_or_else(|| {
        let known: Vec<&str> = PlatformKind::CONCRETE.iter().map(PlatformKind::name).collect();
        format!("unknown platform '{s}' (expected one of: {}, auto)", known.join(", "))
    })
}
