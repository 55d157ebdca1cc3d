//! Launch script for federations whose federates all run on the build host.

use std::fmt;

/// A bash script that starts every federate executable and waits for all of them.
///
/// Executables are expected next to the script, named `<app>_<federate>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchScript {
    pub app_name: String,
    pub federates: Vec<String>,
}

impl LaunchScript {
    pub fn new(app_name: impl Into<String>, federates: impl IntoIterator<Item = String>) -> Self {
        Self {
            app_name: app_name.into(),
            federates: federates.into_iter().collect(),
        }
    }

    /// Relative path of the script in the output root.
    pub fn path(&self) -> String {
        format!("bin/{}", self.app_name)
    }
}

impl fmt::Display for LaunchScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#!/usr/bin/env bash")?;
        writeln!(f, "# Launches all federates of {}. Generated file, do not edit.", self.app_name)?;
        writeln!(f, "set -euo pipefail")?;
        writeln!(f)?;
        writeln!(f, "SCRIPT_DIR=\"$(cd \"$(dirname \"${{BASH_SOURCE[0]}}\")\" && pwd)\"")?;
        writeln!(f, "pids=()")?;
        writeln!(f)?;
        writeln!(f, "cleanup() {{")?;
        writeln!(f, "  for pid in \"${{pids[@]}}\"; do")?;
        writeln!(f, "    kill \"$pid\" 2>/dev/null || true")?;
        writeln!(f, "  done")?;
        writeln!(f, "}}")?;
        writeln!(f, "trap cleanup EXIT INT TERM")?;
        writeln!(f)?;
        for federate in &self.federates {
            writeln!(f, "echo \"Starting federate {federate}\"")?;
            writeln!(f, "\"$SCRIPT_DIR/{}_{federate}\" \"$@\" &", self.app_name)?;
            writeln!(f, "pids+=($!)")?;
        }
        writeln!(f)?;
        writeln!(f, "status=0")?;
        writeln!(f, "for pid in \"${{pids[@]}}\"; do")?;
        writeln!(f, "  wait \"$pid\" || status=$?")?;
        writeln!(f, "done")?;
        writeln!(f, "exit \"$status\"")
    }
}
