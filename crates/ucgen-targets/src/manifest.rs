//! The `ucgen.toml` project manifest.

use serde::{Deserialize, Serialize};

use crate::federate::{FederateDescriptor, SizingHints};
use crate::options::TargetOptions;

/// Project identity section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSection {
    /// Application name; names the native build target and the launch script.
    pub name: String,
    /// Name of the main reactor definition. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
}

impl ProjectSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main: None,
        }
    }

    /// Main reactor name.
    pub fn main_name(&self) -> &str {
        self.main.as_deref().unwrap_or(&self.name)
    }
}

/// Federation-wide generation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FederationSettings {
    /// Continue address numbering across federation passes in one process
    /// instead of starting every pass from a fresh allocator.
    pub shared_numbering: bool,
}

/// A complete project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectManifest {
    pub project: ProjectSection,
    #[serde(default)]
    pub target: TargetOptions,
    /// Project-wide sizing hints.
    #[serde(default)]
    pub sizing: SizingHints,
    #[serde(default)]
    pub federation: FederationSettings,
    /// Federates; empty for a standalone application.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub federates: Vec<FederateDescriptor>,
}

impl ProjectManifest {
    /// A standalone manifest with default options.
    pub fn standalone(name: impl Into<String>) -> Self {
        Self {
            project: ProjectSection::new(name),
            target: TargetOptions::default(),
            sizing: SizingHints::default(),
            federation: FederationSettings::default(),
            federates: Vec::new(),
        }
    }

    /// Whether this manifest describes a federated program.
    pub fn is_federated(&self) -> bool {
        !self.federates.is_empty()
    }

    /// Fill in missing federate ordinals with their declaration index.
    pub fn assign_ordinals(&mut self) {
        for (index, federate) in self.federates.iter_mut().enumerate() {
            federate.ordinal.get_or_insert(index);
        }
    }

    /// Sizing hints for a federate, falling back to the project-wide hints.
    pub fn sizing_for(&self, federate: &FederateDescriptor) -> SizingHints {
        federate.sizing.unwrap_or(self.sizing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_defaults_to_project_name() {
        let mut section = ProjectSection::new("Blink");
        assert_eq!(section.main_name(), "Blink");
        section.main = Some("Main".into());
        assert_eq!(section.main_name(), "Main");
    }

    #[test]
    fn ordinals_keep_explicit_values() {
        let mut manifest = ProjectManifest::standalone("Fed");
        let mut late = FederateDescriptor::new("b", 7);
        late.ordinal = Some(7);
        let mut early = FederateDescriptor::new("a", 0);
        early.ordinal = None;
        manifest.federates = vec![early, late];
        manifest.assign_ordinals();
        assert_eq!(manifest.federates[0].ordinal, Some(0));
        assert_eq!(manifest.federates[1].ordinal, Some(7));
    }

    #[test]
    fn federate_sizing_falls_back() {
        let mut manifest = ProjectManifest::standalone("Fed");
        manifest.sizing = SizingHints::new(4, 5);
        let mut fed = FederateDescriptor::new("f0", 0);
        assert_eq!(manifest.sizing_for(&fed), SizingHints::new(4, 5));
        fed.sizing = Some(SizingHints::new(1, 2));
        assert_eq!(manifest.sizing_for(&fed), SizingHints::new(1, 2));
    }
}
