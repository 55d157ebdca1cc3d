//! In-memory artifacts and the final write step.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ArtifactError, Result};

/// One fully composed output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Path relative to the output root, `/`-separated.
    pub path: String,
    pub content: String,
    /// Set the executable bit when written.
    pub executable: bool,
}

impl GeneratedArtifact {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            executable: false,
        }
    }

    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }

    /// Lowercase hex SHA-256 of the content.
    pub fn sha256(&self) -> String {
        let digest = Sha256::digest(self.content.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// An ordered set of artifacts keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<GeneratedArtifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact. An artifact already at the same path is replaced in place.
    pub fn push(&mut self, artifact: GeneratedArtifact) {
        match self.artifacts.iter_mut().find(|a| a.path == artifact.path) {
            Some(existing) => {
                debug!(path = %artifact.path, "replacing artifact");
                *existing = artifact;
            }
            None => self.artifacts.push(artifact),
        }
    }

    pub fn get(&self, path: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Move every artifact of `other` under `dir`.
    pub fn extend_under(&mut self, dir: &str, other: ArtifactSet) {
        let dir = dir.trim_end_matches('/');
        for mut artifact in other.artifacts {
            if !dir.is_empty() {
                artifact.path = format!("{dir}/{}", artifact.path);
            }
            self.push(artifact);
        }
    }

    /// Write every artifact below `root`, creating parent directories.
    ///
    /// Stops at the first failure; artifacts written before it stay on disk.
    pub fn write_all(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = root.join(&artifact.path);
            write_one(&path, artifact)?;
            debug!(path = %path.display(), bytes = artifact.content.len(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }
}

impl IntoIterator for ArtifactSet {
    type Item = GeneratedArtifact;
    type IntoIter = std::vec::IntoIter<GeneratedArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}

fn write_one(path: &Path, artifact: &GeneratedArtifact) -> Result<()> {
    let wrap = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::write(path, &artifact.content).map_err(wrap)?;
    if artifact.executable {
        set_executable(path).map_err(wrap)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
