//! Entry-point stub generator.

use tracing::debug;

use super::{ArtifactGenerator, UnitContext};
use crate::artifact::{ArtifactSet, GeneratedArtifact};
use crate::error::Result;
use crate::main_gen::{MainFlavor, MainStub, MAIN_SOURCE_PATH};

/// Writes `lf_main.c` in the platform's entry-point style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MainGenerator {
    pub flavor: MainFlavor,
}

impl MainGenerator {
    pub fn new(flavor: MainFlavor) -> Self {
        Self { flavor }
    }
}

impl ArtifactGenerator for MainGenerator {
    fn name(&self) -> &str {
        match self.flavor {
            MainFlavor::Default => "main",
            MainFlavor::FreeRtos => "main-freertos",
            MainFlavor::EspIdf => "main-esp-idf",
        }
    }

    fn generate(&self, unit: &UnitContext<'_>, out: &mut ArtifactSet) -> Result<()> {
        debug!(flavor = self.flavor.name(), unit = %unit.project_name(), "generating entry point");
        let stub = MainStub {
            flavor: self.flavor,
            main_name: unit.main_name().to_string(),
            sizing: unit.sizing,
            federate: unit.federate_name().map(str::to_string),
        };
        out.push(GeneratedArtifact::new(MAIN_SOURCE_PATH, stub.to_string()));
        Ok(())
    }
}
