//! Errors raised while reading, writing or checking a project manifest.

use std::path::PathBuf;

use crate::parse::ValidationIssue;

/// Why a `ucgen.toml` manifest could not be used.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Not TOML, or not shaped like a manifest.
    #[error("malformed manifest: {0}")]
    Malformed(#[from] toml::de::Error),

    #[error("cannot serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no manifest at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("project.name must not be empty")]
    EmptyProjectName,

    /// Validation found at least one blocking issue. `issues` also holds the
    /// warnings found in the same run.
    #[error(
        "{} error(s) in manifest of '{project}'",
        .issues.iter().filter(|i| i.is_error()).count()
    )]
    Invalid {
        project: String,
        issues: Vec<ValidationIssue>,
    },
}

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, TargetError>;
