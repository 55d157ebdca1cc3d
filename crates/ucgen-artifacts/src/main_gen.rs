//! Platform entry-point stubs.
//!
//! The stub only wires the runtime's generated `lf_start()` into the
//! platform's notion of a program entry; the reactor program itself is
//! generated elsewhere.

use std::fmt;

use ucgen_targets::SizingHints;

/// Relative path of the generated entry point.
pub const MAIN_SOURCE_PATH: &str = "lf_main.c";

/// Default stack size of the FreeRTOS main task, overridable at build time.
pub const FREERTOS_MAIN_TASK_STACK: u32 = 4096;

/// Entry-point style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MainFlavor {
    /// Plain `int main(void)`.
    #[default]
    Default,
    /// A FreeRTOS task started from `main`.
    FreeRtos,
    /// `void app_main(void)` called by ESP-IDF.
    EspIdf,
}

impl MainFlavor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::FreeRtos => "freertos",
            Self::EspIdf => "esp-idf",
        }
    }
}

/// An entry-point stub for one deployment unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainStub {
    pub flavor: MainFlavor,
    pub main_name: String,
    pub sizing: SizingHints,
    pub federate: Option<String>,
}

impl fmt::Display for MainStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// Generated entry point for {}. Do not edit.", self.main_name)?;
        writeln!(f, "#include \"reactor-uc/reactor-uc.h\"")?;
        if self.flavor == MainFlavor::FreeRtos {
            writeln!(f, "#include \"FreeRTOS.h\"")?;
            writeln!(f, "#include \"task.h\"")?;
        }
        writeln!(f)?;
        writeln!(f, "#define LF_EVENT_QUEUE_SIZE {}", self.sizing.events)?;
        writeln!(f, "#define LF_REACTION_QUEUE_SIZE {}", self.sizing.reactions)?;
        if let Some(federate) = &self.federate {
            writeln!(f, "#define LF_FEDERATE_NAME \"{federate}\"")?;
        }
        writeln!(f)?;
        writeln!(f, "void lf_start(void);")?;
        writeln!(f)?;
        match self.flavor {
            MainFlavor::Default => {
                writeln!(f, "int main(void) {{")?;
                writeln!(f, "  lf_start();")?;
                writeln!(f, "  return 0;")?;
                writeln!(f, "}}")
            }
            MainFlavor::FreeRtos => {
                writeln!(f, "#ifndef LF_MAIN_TASK_STACK_SIZE")?;
                writeln!(f, "#define LF_MAIN_TASK_STACK_SIZE {FREERTOS_MAIN_TASK_STACK}")?;
                writeln!(f, "#endif")?;
                writeln!(f)?;
                writeln!(f, "static void lf_main_task(void *arg) {{")?;
                writeln!(f, "  (void)arg;")?;
                writeln!(f, "  lf_start();")?;
                writeln!(f, "  vTaskDelete(NULL);")?;
                writeln!(f, "}}")?;
                writeln!(f)?;
                writeln!(f, "int main(void) {{")?;
                writeln!(
                    f,
                    "  xTaskCreate(lf_main_task, \"lf_main\", LF_MAIN_TASK_STACK_SIZE, NULL, \
                     tskIDLE_PRIORITY + 1, NULL);"
                )?;
                writeln!(f, "  vTaskStartScheduler();")?;
                writeln!(f, "  return 0;")?;
                writeln!(f, "}}")
            }
            MainFlavor::EspIdf => {
                writeln!(f, "void app_main(void) {{")?;
                writeln!(f, "  lf_start();")?;
                writeln!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(flavor: MainFlavor, federate: Option<&str>) -> String {
        MainStub {
            flavor,
            main_name: "Main".into(),
            sizing: SizingHints::new(8, 12),
            federate: federate.map(str::to_string),
        }
        .to_string()
    }

    #[test]
    fn default_entry_substitutes_sizing() {
        let text = stub(MainFlavor::Default, None);
        assert!(text.contains("#define LF_EVENT_QUEUE_SIZE 8\n#define LF_REACTION_QUEUE_SIZE 12"));
        assert!(text.contains("int main(void) {\n  lf_start();"));
        assert!(!text.contains("LF_FEDERATE_NAME"));
    }

    #[test]
    fn freertos_entry_starts_scheduler() {
        let text = stub(MainFlavor::FreeRtos, Some("f0"));
        assert!(text.contains("#define LF_FEDERATE_NAME \"f0\""));
        let stack_default = "#ifndef LF_MAIN_TASK_STACK_SIZE\n\
                             #define LF_MAIN_TASK_STACK_SIZE 4096\n\
                             #endif";
        assert!(text.contains(stack_default));
        let create = text.find("xTaskCreate(").unwrap();
        let start = text.find("vTaskStartScheduler();").unwrap();
        assert!(create < start);
    }

    #[test]
    fn esp_idf_entry_is_app_main() {
        let text = stub(MainFlavor::EspIdf, None);
        assert!(text.contains("void app_main(void) {"));
        assert!(!text.contains("int main"));
    }
}
