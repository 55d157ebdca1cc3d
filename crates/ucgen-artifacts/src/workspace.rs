//! Read-only probes into the user's workspace.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Looks up user-provided files by relative name.
///
/// A missing or unreadable file is reported as `None`, never as an error.
pub trait WorkspaceProbe: fmt::Debug + Send + Sync {
    fn read(&self, relative: &str) -> Option<String>;
}

/// A workspace directory on disk.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl WorkspaceProbe for FsWorkspace {
    fn read(&self, relative: &str) -> Option<String> {
        let path = self.root.join(relative);
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!(
                    path = %path.display(),
                    error = %e,
                    "unreadable workspace file treated as absent"
                );
                None
            }
        }
    }
}

/// An in-memory workspace.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    files: BTreeMap<String, String>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, relative: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(relative.into(), content.into());
        self
    }
}

impl WorkspaceProbe for MemoryWorkspace {
    fn read(&self, relative: &str) -> Option<String> {
        self.files.get(relative).cloned()
    }
}

/// A workspace with no files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWorkspace;

impl WorkspaceProbe for NoWorkspace {
    fn read(&self, _relative: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_workspace_reads_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prj.conf"), "CONFIG_X=1\n").unwrap();
        let ws = FsWorkspace::new(dir.path());
        assert_eq!(ws.read("prj.conf").as_deref(), Some("CONFIG_X=1\n"));
        assert_eq!(ws.read("app.overlay"), None);
    }

    #[test]
    fn fs_workspace_directory_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Kconfig")).unwrap();
        assert_eq!(FsWorkspace::new(dir.path()).read("Kconfig"), None);
    }

    #[test]
    fn fs_workspace_invalid_utf8_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Kconfig"), [0xff, 0xfe, 0x00]).unwrap();
        assert_eq!(FsWorkspace::new(dir.path()).read("Kconfig"), None);
    }

    #[test]
    fn memory_and_empty_workspaces() {
        let ws = MemoryWorkspace::new().with_file("Kconfig", "config X\n");
        assert_eq!(ws.read("Kconfig").as_deref(), Some("config X\n"));
        assert_eq!(ws.read("prj.conf"), None);
        assert_eq!(NoWorkspace.read("Kconfig"), None);
    }
}
